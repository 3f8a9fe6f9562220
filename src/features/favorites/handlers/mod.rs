pub mod favorite_handler;
