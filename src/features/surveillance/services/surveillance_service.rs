use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::surveillance::dtos::{
    CompletionResponseDto, CreateItemDto, HistoryEntryDto, NextDueDateResponseDto,
    SurveillanceItemResponseDto, UpdateItemDto,
};
use crate::features::surveillance::history_stats::{self, HistoryStats};
use crate::features::surveillance::models::{
    Attachment, AttachmentMeta, CompletionRecord, ItemUpdate, NewAttachment, NewHistoryEntry,
    NewSurveillanceItem, SurveillanceItem,
};
use crate::features::surveillance::periodicity::{self, Cadence, FALLBACK_CADENCE};
use crate::features::surveillance::repository::SurveillanceRepository;
use crate::shared::constants::HISTORY_PAGE_SIZE;

/// Service for inspection items and their completion history
pub struct SurveillanceService {
    repo: Arc<dyn SurveillanceRepository>,
}

impl SurveillanceService {
    pub fn new(repo: Arc<dyn SurveillanceRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_items(&self, category: Option<&str>) -> Result<Vec<SurveillanceItemResponseDto>> {
        let items = self.repo.list_items(category).await?;
        Ok(items.into_iter().map(|i| i.into()).collect())
    }

    pub async fn get_item(&self, id: Uuid) -> Result<SurveillanceItemResponseDto> {
        Ok(self.load_item(id).await?.into())
    }

    pub async fn create_item(&self, dto: CreateItemDto) -> Result<SurveillanceItemResponseDto> {
        Cadence::resolve(&dto.periodicity)?;

        let item = self
            .repo
            .create_item(NewSurveillanceItem {
                category: dto.category,
                label: dto.label.trim().to_string(),
                building: dto.building.filter(|b| !b.trim().is_empty()),
                periodicity: dto.periodicity,
                next_due_date: dto.next_due_date,
            })
            .await?;

        tracing::info!(
            "Surveillance item {} created in category {}",
            item.id,
            item.category
        );
        Ok(item.into())
    }

    /// Apply a partial update; absent fields keep their value and an empty
    /// `building` clears it
    pub async fn update_item(
        &self,
        id: Uuid,
        dto: UpdateItemDto,
    ) -> Result<SurveillanceItemResponseDto> {
        if let Some(periodicity) = &dto.periodicity {
            Cadence::resolve(periodicity)?;
        }

        let item = self.load_item(id).await?;
        let update = ItemUpdate {
            category: dto.category.unwrap_or(item.category),
            label: dto
                .label
                .map(|l| l.trim().to_string())
                .unwrap_or(item.label),
            building: match dto.building {
                Some(b) if b.trim().is_empty() => None,
                Some(b) => Some(b.trim().to_string()),
                None => item.building,
            },
            periodicity: dto.periodicity.unwrap_or(item.periodicity),
            status: dto.status.unwrap_or(item.status),
            next_due_date: dto.next_due_date.or(item.next_due_date),
        };

        let item = self
            .repo
            .update_item(id, update)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Surveillance item {} not found", id)))?;

        tracing::info!("Surveillance item {} updated", id);
        Ok(item.into())
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<()> {
        if !self.repo.delete_item(id).await? {
            return Err(AppError::NotFound(format!(
                "Surveillance item {} not found",
                id
            )));
        }

        tracing::info!("Surveillance item {} deleted", id);
        Ok(())
    }

    /// Record a completed control.
    ///
    /// The next due date is resolved before anything is written, then the
    /// history entry, its attachments and the item's new schedule are stored
    /// together.
    pub async fn complete_item(
        &self,
        item_id: Uuid,
        record: CompletionRecord,
        attachments: Vec<NewAttachment>,
        user: &AuthenticatedUser,
    ) -> Result<CompletionResponseDto> {
        let item = self.load_item(item_id).await?;
        let next_due_date = periodicity::next_due_date(record.completion_date, &item.periodicity)?;

        let recorded = self
            .repo
            .record_completion(
                NewHistoryEntry {
                    item_id,
                    completion_date: record.completion_date,
                    comments: record.comments,
                    result: record.result,
                    duration_label: record.duration_label,
                    validated_by: Some(user.user_id.clone()),
                },
                attachments,
                next_due_date,
            )
            .await?;

        tracing::info!(
            "Surveillance item {} completed on {} by {}, next control {}",
            item_id,
            recorded.entry.completion_date,
            user.user_id,
            next_due_date
        );

        Ok(CompletionResponseDto {
            item: recorded.item.into(),
            history: HistoryEntryDto::new(recorded.entry, recorded.attachments),
            next_due_date,
        })
    }

    /// Next due date for a control on `date`, without recording anything
    pub fn preview_next_due_date(
        &self,
        date: NaiveDate,
        periodicity: &str,
    ) -> Result<NextDueDateResponseDto> {
        let cadence = Cadence::resolve(periodicity)?;
        let next_due_date = cadence.advance(date)?;

        Ok(NextDueDateResponseDto {
            date,
            periodicity: periodicity.to_string(),
            cadence,
            next_due_date,
        })
    }

    /// Latest history entries of an item, newest first
    pub async fn list_history(&self, item_id: Uuid) -> Result<Vec<HistoryEntryDto>> {
        self.load_item(item_id).await?;

        let entries = self
            .repo
            .list_history(item_id, Some(HISTORY_PAGE_SIZE))
            .await?;
        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();

        let mut by_entry: HashMap<Uuid, Vec<AttachmentMeta>> = HashMap::new();
        for attachment in self.repo.list_attachments(&ids).await? {
            by_entry
                .entry(attachment.history_id)
                .or_default()
                .push(attachment);
        }

        Ok(entries
            .into_iter()
            .map(|entry| {
                let mut attachments = by_entry.remove(&entry.id).unwrap_or_default();
                attachments.sort_by_key(|a| a.position);
                HistoryEntryDto::new(entry, attachments)
            })
            .collect())
    }

    pub async fn history_stats(&self, item_id: Uuid) -> Result<HistoryStats> {
        let item = self.load_item(item_id).await?;
        let history = self.repo.list_history(item_id, None).await?;
        let cadence = Cadence::classify(&item.periodicity).unwrap_or(FALLBACK_CADENCE);

        Ok(history_stats::compute(&history, cadence))
    }

    pub async fn get_attachment(&self, id: Uuid) -> Result<Attachment> {
        self.repo
            .get_attachment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attachment {} not found", id)))
    }

    async fn load_item(&self, id: Uuid) -> Result<SurveillanceItem> {
        self.repo
            .get_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Surveillance item {} not found", id)))
    }
}
