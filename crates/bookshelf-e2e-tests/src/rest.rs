use anyhow::Result;
use bookshelf_dal::book::Book;
use reqwest::Url;
use serde_json::json;
use tracing::info;

pub fn book_payload(
    title: &str,
    author: &str,
    genre: &str,
    price: f64,
    stock: i64,
) -> serde_json::Value {
    json!({"title": title, "author": author, "genre": genre, "price": price, "stock": stock})
}

pub async fn create_book<T>(client: &reqwest::Client, base_url: &Url, payload: &T) -> Result<Book>
where
    T: serde::Serialize,
{
    let api_url = base_url.join("api/books")?;

    let response = client.post(api_url).json(payload).send().await?;
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);

    let new_book: Book = response.json().await?;
    Ok(new_book)
}
