pub mod category_order_handler;
pub mod history_handler;
pub mod item_handler;

pub use category_order_handler::{
    __path_edit_category_order, __path_get_category_order, __path_save_category_order,
    edit_category_order, get_category_order, save_category_order,
};
pub use history_handler::{
    __path_download_attachment, __path_history_stats, __path_list_history, download_attachment,
    history_stats, list_history,
};
pub use item_handler::{
    __path_complete_item, __path_create_item, __path_delete_item, __path_get_item,
    __path_list_items, __path_preview_next_due_date, __path_update_item, complete_item,
    create_item, delete_item, get_item, list_items, preview_next_due_date, update_item,
};
