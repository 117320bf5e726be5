pub mod process_file_response;
pub mod process_file_route;
