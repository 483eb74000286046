pub mod content;
pub mod pages;
pub mod spaces;

// Re-export public data functions for the MCP tool handlers and REST routes
pub use content::{add_attachment_data, add_comment_data};
pub use pages::{
    create_page_data, delete_page_data, get_page_data, list_pages_data, move_page_data,
    search_pages_data, update_page_data, UpdatePageParams,
};
pub use spaces::{get_space_id_from_key, list_spaces_data, resolve_space};
