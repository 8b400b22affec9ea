pub mod movie;
pub mod tmdb;

pub use movie::{Movie, MoviePatch, NewMovie};
pub use tmdb::{TmdbListResponse, TmdbMovie, TmdbMovieDetails};
