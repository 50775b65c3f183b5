pub mod category_order_dto;
pub mod history_dto;
pub mod item_dto;

pub use category_order_dto::{
    CategoryEntryDto, CategoryOrderResponseDto, EditCategoryOrderDto, SaveCategoryOrderDto,
};
pub use history_dto::{AttachmentDto, HistoryEntryDto};
pub use item_dto::{
    is_mime_type_allowed, CompleteItemForm, CompletionResponseDto, CreateItemDto,
    DeleteItemResponseDto, ItemQueryParams, NextDueDateQuery, NextDueDateResponseDto,
    SurveillanceItemResponseDto, UpdateItemDto, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
