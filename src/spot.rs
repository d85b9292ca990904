//! Spot detection: turning a captioned photo into a score update

use teloxide::types::{Message, MessageEntity, MessageEntityKind, MessageEntityRef, User};
use tracing::info;

use crate::db::{GroupId, ScoreStore};
use crate::errors::StoreError;
use crate::localization::LocalizationManager;

/// Marker Telegram puts in front of a username mention
const MENTION_MARKER: char = '@';

/// A caption entity, reduced to what spotting cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionEntity {
    /// An `@username` mention, marker stripped
    Mention(String),
    Other,
}

/// One spot: `sender` tagged every member in `mentions` (caption order, duplicates kept)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotEvent {
    pub group: GroupId,
    pub sender: String,
    pub mentions: Vec<String>,
}

/// Outcome of looking at an inbound post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Spot(SpotEvent),
    /// Not a photo, or no mention in the caption; ignored without a reply
    NotQualified,
}

/// Identifier a member is scored under: the username, else "first last"
pub fn display_identifier(username: Option<&str>, first_name: &str, last_name: Option<&str>) -> String {
    match username {
        Some(username) if !username.is_empty() => username.to_string(),
        _ => match last_name {
            Some(last_name) if !last_name.is_empty() => format!("{first_name} {last_name}"),
            _ => first_name.to_string(),
        },
    }
}

pub fn member_identifier(user: &User) -> String {
    display_identifier(
        user.username.as_deref(),
        &user.first_name,
        user.last_name.as_deref(),
    )
}

/// Slice the caption into typed entities. Offsets are UTF-16 based, so slicing goes
/// through [`MessageEntityRef::parse`].
pub fn caption_entities(caption: &str, entities: &[MessageEntity]) -> Vec<CaptionEntity> {
    MessageEntityRef::parse(caption, entities)
        .into_iter()
        .map(|entity| match entity.kind() {
            MessageEntityKind::Mention => {
                let text = entity.text();
                CaptionEntity::Mention(text.strip_prefix(MENTION_MARKER).unwrap_or(text).to_string())
            }
            _ => CaptionEntity::Other,
        })
        .collect()
}

/// Decide whether a post is a spot
pub fn classify_post(
    group: GroupId,
    sender: &str,
    has_photo: bool,
    caption: Option<&str>,
    entities: &[MessageEntity],
) -> Classification {
    if !has_photo {
        return Classification::NotQualified;
    }
    let Some(caption) = caption else {
        return Classification::NotQualified;
    };

    let mentions: Vec<String> = caption_entities(caption, entities)
        .into_iter()
        .filter_map(|entity| match entity {
            CaptionEntity::Mention(name) => Some(name),
            CaptionEntity::Other => None,
        })
        .collect();

    if mentions.is_empty() {
        return Classification::NotQualified;
    }

    Classification::Spot(SpotEvent {
        group,
        sender: sender.to_string(),
        mentions,
    })
}

/// Classify a Telegram message; posts without a user sender never qualify
pub fn classify_message(msg: &Message) -> Classification {
    let Some(user) = msg.from.as_ref() else {
        return Classification::NotQualified;
    };

    classify_post(
        msg.chat.id.0,
        &member_identifier(user),
        msg.photo().is_some(),
        msg.caption(),
        msg.caption_entities().unwrap_or(&[]),
    )
}

/// Reply announcing a recorded spot
pub fn spot_confirmation(messages: &LocalizationManager, event: &SpotEvent) -> String {
    messages.get_message_with_args(
        "spot-recorded",
        &[
            ("sender", event.sender.as_str()),
            ("mentions", event.mentions.join(", ").as_str()),
        ],
    )
}

/// Apply the event to its group's store as one transaction and build the reply
pub async fn process_spot(
    store: &ScoreStore,
    messages: &LocalizationManager,
    event: &SpotEvent,
) -> Result<String, StoreError> {
    let mut handle = store.ensure(event.group).await?;
    handle.apply_spot(&event.sender, &event.mentions).await?;
    handle.close().await?;

    info!(
        group = event.group,
        member = %event.sender,
        mentions = event.mentions.len(),
        "Spot recorded"
    );

    Ok(spot_confirmation(messages, event))
}
