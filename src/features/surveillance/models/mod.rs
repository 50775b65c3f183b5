mod attachment;
mod history_entry;
mod surveillance_item;

pub use attachment::{Attachment, AttachmentMeta, NewAttachment};
pub use history_entry::{
    CompletionRecord, ConformityResult, HistoryEntry, NewHistoryEntry, RecordedCompletion,
};
pub use surveillance_item::{ItemStatus, ItemUpdate, NewSurveillanceItem, SurveillanceItem};
