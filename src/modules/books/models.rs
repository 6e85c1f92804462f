use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored book record. `id` is assigned by the database on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
}

impl Book {
    /// A book that has not been persisted yet
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            author: author.into(),
        }
    }
}

/// Request model for creating a new book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewBookRequest {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

impl NewBookRequest {
    /// Both fields must contain something other than whitespace.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.author.trim().is_empty()
    }
}

/// Book as returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    /// Database-assigned identifier
    pub id: u64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

impl From<NewBookRequest> for Book {
    fn from(request: NewBookRequest) -> Self {
        Book::new(request.title, request.author)
    }
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_with_blank_field_is_incomplete() {
        let request = NewBookRequest {
            title: "  ".to_string(),
            author: "Frank Herbert".to_string(),
        };
        assert!(!request.is_complete());

        let request = NewBookRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        };
        assert!(request.is_complete());
    }

    #[test]
    fn new_book_has_no_id() {
        let book = Book::from(NewBookRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        });
        assert_eq!(book.id, 0);
        assert_eq!(book.title, "Dune");
    }
}
