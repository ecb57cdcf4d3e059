pub mod economia;
