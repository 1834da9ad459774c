#![forbid(unsafe_code)]

pub mod analytics;
pub mod error;
pub mod feedback_service;
pub mod http_analytics;
pub mod progress_service;
pub mod project_service;

pub use course_core::Clock;

pub use analytics::{AnalyticsEvent, AnalyticsSink, NoopSink, RecordingSink};
pub use error::{AnalyticsError, FeedbackServiceError, ProgressServiceError, ProjectServiceError};
pub use feedback_service::FeedbackService;
pub use http_analytics::{HttpSink, HttpSinkConfig};
pub use progress_service::{LessonStart, ProgressService};
pub use project_service::ProjectService;
