pub mod secret_file;
