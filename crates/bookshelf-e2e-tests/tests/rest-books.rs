use std::time::Duration;

use bookshelf_dal::book::Book;
use bookshelf_e2e_tests::{
    extend_url, launch_env, prepare_env,
    rest::{book_payload, create_book},
};
use tracing::info;
use tracing_test::traced_test;

const LENGTH_MSG: &str = "Title and Author must be between 2 and 120 characters long.";
const GENRE_MSG: &str = "Genre must be one of the following: ficção, romance, mistério.";
const PRICE_MSG: &str = "Price must be a non-negative value.";
const STOCK_MSG: &str = "Stock must be a non-negative integer.";
const DUPLICATE_MSG: &str = "A book with the same title and author already exists.";

#[tokio::test]
#[traced_test]
async fn test_books_crud() {
    let (args, _config_guard) = prepare_env("test_books_crud").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _server) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/books").unwrap();

    let payload = book_payload("Dom Casmurro", "Machado de Assis", "romance", 39.9, 3);
    let response = client.post(api_url.clone()).json(&payload).send().await.unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let created: Book = response.json().await.unwrap();
    let record_url = extend_url(&api_url, created.id);
    assert_eq!(location, record_url.as_str());
    assert_eq!(created.created_at, created.updated_at);

    let response = client.get(record_url.clone()).send().await.unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 200);
    let fetched: Book = response.json().await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.title, "Dom Casmurro");
    assert_eq!(fetched.author, "Machado de Assis");
    assert_eq!(fetched.genre, "romance");
    assert_eq!(fetched.price, 39.9);
    assert_eq!(fetched.stock, 3);

    let response = client.get(api_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let books: Vec<Book> = response.json().await.unwrap();
    assert_eq!(books, vec![created.clone()]);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let update = book_payload("Dom Casmurro", "Machado de Assis", "Ficção", 29.9, 0);
    let response = client
        .put(record_url.clone())
        .json(&update)
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 204);

    let updated: Book = client
        .get(record_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.genre, "Ficção");
    assert_eq!(updated.price, 29.9);
    assert_eq!(updated.stock, 0);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > updated.created_at);

    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.get(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(response.text().await.unwrap(), "Book not found.");

    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client.put(record_url).json(&update).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let books: Vec<Book> = client.get(api_url).send().await.unwrap().json().await.unwrap();
    assert!(books.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_validation_messages() {
    let (args, _config_guard) = prepare_env("test_validation").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _server) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/books").unwrap();

    let long = "x".repeat(121);
    let cases = [
        (book_payload("D", "Herbert", "ficção", 1.0, 1), LENGTH_MSG),
        (book_payload("Dune", &long, "ficção", 1.0, 1), LENGTH_MSG),
        (book_payload("D", "H", "poetry", -1.0, -1), LENGTH_MSG),
        (book_payload("Dune", "Herbert", "poetry", -1.0, -1), GENRE_MSG),
        (book_payload("Dune", "Herbert", "", 1.0, 1), GENRE_MSG),
        (book_payload("Dune", "Herbert", "ficção", -0.5, -1), PRICE_MSG),
        (book_payload("Dune", "Herbert", "ficção", 0.0, -1), STOCK_MSG),
    ];

    for (payload, expected) in cases.iter() {
        let response = client.post(api_url.clone()).json(payload).send().await.unwrap();
        info!("Response: {:#?}", response);
        assert_eq!(response.status().as_u16(), 400);
        assert_eq!(response.text().await.unwrap(), *expected);
    }

    let books: Vec<Book> = client
        .get(api_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(books.is_empty());

    let book = create_book(
        &client,
        &base_url,
        &book_payload("  Dune", "Herbert", " MISTÉRIO ", 0.0, 0),
    )
    .await
    .unwrap();
    let record_url = extend_url(&api_url, book.id);

    for (payload, expected) in cases.iter() {
        let response = client
            .put(record_url.clone())
            .json(payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        assert_eq!(response.text().await.unwrap(), *expected);
    }

    let unchanged: Book = client.get(record_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(unchanged, book);
}

#[tokio::test]
#[traced_test]
async fn test_duplicates() {
    let (args, _config_guard) = prepare_env("test_duplicates").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _server) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/books").unwrap();

    create_book(
        &client,
        &base_url,
        &book_payload("Dune", "Herbert", "ficção", 10.0, 1),
    )
    .await
    .unwrap();

    for (title, author) in [("Dune", "Herbert"), ("dune", "HERBERT"), ("  Dune ", "Herbert\t")] {
        let response = client
            .post(api_url.clone())
            .json(&book_payload(title, author, "romance", 5.0, 5))
            .send()
            .await
            .unwrap();
        info!("Response: {:#?}", response);
        assert_eq!(response.status().as_u16(), 409);
        assert_eq!(response.text().await.unwrap(), DUPLICATE_MSG);
    }

    create_book(
        &client,
        &base_url,
        &book_payload("Dune", "Frank Herbert", "ficção", 10.0, 1),
    )
    .await
    .unwrap();

    let books: Vec<Book> = client.get(api_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(books.len(), 2);
}

#[tokio::test]
#[traced_test]
async fn test_update_may_collide() {
    let (args, _config_guard) = prepare_env("test_update_collide").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _server) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/books").unwrap();

    let first = create_book(
        &client,
        &base_url,
        &book_payload("Emma", "Austen", "romance", 12.0, 4),
    )
    .await
    .unwrap();
    let second = create_book(
        &client,
        &base_url,
        &book_payload("Persuasion", "Austen", "romance", 14.0, 2),
    )
    .await
    .unwrap();

    // duplicate check applies only on create
    let response = client
        .put(extend_url(&api_url, second.id))
        .json(&book_payload("EMMA", "austen", "romance", 14.0, 2))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let books: Vec<Book> = client.get(api_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].id, first.id);
    assert_eq!(books[1].id, second.id);
    assert_eq!(books[1].title, "EMMA");
}

#[tokio::test]
#[traced_test]
async fn test_unknown_and_malformed_ids() {
    let (args, _config_guard) = prepare_env("test_ids").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _server) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/books").unwrap();

    let response = client
        .get(extend_url(&api_url, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .get(extend_url(&api_url, "not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .post(api_url.clone())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"title\": \"Dune\"")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .post(api_url.clone())
        .json(&serde_json::json!({"title": "Dune", "author": "Herbert", "genre": "ficção", "price": 1.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .post(api_url)
        .json(&book_payload("Dune", "Herbert", "ficção", 1.0, 3_000_000_000))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[traced_test]
async fn test_parallel_creates() {
    let (args, _config_guard) = prepare_env("test_parallel_creates").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _server) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/books").unwrap();

    let post = |payload: serde_json::Value| {
        let client = client.clone();
        let api_url = api_url.clone();
        async move {
            let response = client.post(api_url).json(&payload).send().await.unwrap();
            response.status().as_u16()
        }
    };

    let distinct = (0..12).map(|i| post(book_payload(&format!("Volume {i}"), "Author", "romance", 1.0, 1)));
    let statuses = futures::future::join_all(distinct).await;
    assert!(statuses.iter().all(|s| *s == 201), "Statuses: {statuses:?}");

    let same = (0..12).map(|i| {
        let title = if i % 2 == 0 { "Dune" } else { "  dune" };
        post(book_payload(title, "Herbert", "ficção", 1.0, 1))
    });
    let statuses = futures::future::join_all(same).await;
    info!("Statuses: {:?}", statuses);
    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 11);

    let books: Vec<Book> = client.get(api_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(books.len(), 13);
}
