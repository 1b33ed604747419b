pub mod rental_backend;
