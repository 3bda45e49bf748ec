//! Data models for the Biblio client

pub mod book;
pub mod token;
pub mod user;
pub mod weather;

// Re-export commonly used types
pub use book::{Book, BookResponse, BooksResponse, CreateBook, MessageResponse, UpdateBook};
pub use token::{ClaimValue, TokenInfo, TokenPayload};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, RegistrationForm, User};
pub use weather::{CityLocation, Units, WeatherQuery};
