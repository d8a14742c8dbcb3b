use crate::{ChosenDB, Error, error::Result, validation::is_duplicate};
use bookshelf_types::genre::is_allowed_genre;
use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire as _, Connection as _, Pool};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

fn allowed_genre(genre: &str, _ctx: &()) -> garde::Result {
    if is_allowed_genre(genre) {
        Ok(())
    } else {
        Err(garde::Error::new("unknown genre"))
    }
}

/// Candidate book as received from a client, used for both create and update.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[garde(length(chars, min = 2, max = 120))]
    pub title: String,
    #[garde(length(chars, min = 2, max = 120))]
    pub author: String,
    #[garde(custom(allowed_genre))]
    pub genre: String,
    #[garde(range(min = 0.0))]
    pub price: f64,
    #[garde(range(min = 0))]
    pub stock: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: f64,
    pub stock: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const SELECT_ALL: &str = "SELECT id, title, author, genre, price, stock, created_at, updated_at FROM book ORDER BY created_at, id";
const SELECT_ONE: &str = "SELECT id, title, author, genre, price, stock, created_at, updated_at FROM book WHERE id = ?";

pub type BookRepository = BookRepositoryImpl<Pool<ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E:
        sqlx::Executor<'c, Database = ChosenDB> + sqlx::Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Inserts a new book with fresh id and timestamps.
    ///
    /// Fails with [`Error::DuplicateBook`] if a book with the same title and author
    /// (ignoring case and surrounding whitespace) already exists. The check and
    /// the insert share one transaction, which takes the write lock before reading,
    /// so concurrent creates queue on the busy timeout. Field validation is the
    /// caller's job.
    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let mut conn = self.executor.acquire().await?;
        let mut transaction = conn.begin_with("BEGIN IMMEDIATE").await?;

        let existing: Vec<(String, String)> = sqlx::query_as("SELECT title, author FROM book")
            .fetch_all(&mut *transaction)
            .await?;
        if is_duplicate(
            &payload.title,
            &payload.author,
            existing.iter().map(|(t, a)| (t.as_str(), a.as_str())),
        ) {
            debug!(title = %payload.title, author = %payload.author, "Duplicate book");
            return Err(Error::DuplicateBook);
        }

        let now = OffsetDateTime::now_utc();
        let book = Book {
            id: Uuid::new_v4(),
            title: payload.title,
            author: payload.author,
            genre: payload.genre,
            price: payload.price,
            stock: payload.stock,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO book (id, title, author, genre, price, stock, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(book.price)
        .bind(book.stock)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&mut *transaction)
        .await?;
        transaction.commit().await?;

        debug!(id = %book.id, "Created book");
        Ok(book)
    }

    /// Replaces the mutable fields of an existing book and refreshes `updated_at`.
    ///
    /// No duplicate check happens here.
    pub async fn update(&self, id: Uuid, payload: CreateBook) -> Result<()> {
        let result = sqlx::query(
            "UPDATE book SET title = ?, author = ?, genre = ?, price = ?, stock = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(&payload.genre)
        .bind(payload.price)
        .bind(payload.stock)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(&self.executor)
        .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound("Book".to_string()))
        } else {
            debug!(%id, "Updated book");
            Ok(())
        }
    }

    pub async fn list(&self) -> Result<Vec<Book>> {
        let records = sqlx::query_as::<_, Book>(SELECT_ALL)
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Book".to_string()))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Book> {
        sqlx::query_as::<_, Book>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound("Book".to_string()))
    }
}
