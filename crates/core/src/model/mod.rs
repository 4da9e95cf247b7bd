mod bookmark;
mod content;
mod feedback;
mod ids;
mod progress;
mod user;
mod viewed;

pub use bookmark::Bookmark;
pub use content::{ContentKind, ParseKindError};
pub use feedback::{COMMENT_MAX_CHARS, Comment, CommentError, Feedback, Rating, RatingError};
pub use ids::{FeedbackId, ItemId, UserId};
pub use progress::{
    LearningPath, RECENT_ITEMS_LIMIT, TRACKABLE_ITEMS_TOTAL, UserProgress, average_rating,
    round_to_tenth,
};
pub use user::{Mode, ProfilePatch, Role, User};
pub use viewed::{ViewedKey, ViewedKeyError, ViewedSet};
