//! Dashboard Controls
//!
//! Widget state and the views it drives:
//!
//! - **Selector**: the select-all / deselect-all / multi-select state machine
//! - **Session**: per-client state of the trend and snapshot tabs
//! - **View**: one chart, rendered by a full pipeline pass

mod error;
mod selector;
mod session;
mod view;

pub use error::{ControlError, ControlResult};
pub use selector::{normalize, transition, CountrySelector, SelectorEvent, SelectorState};
pub use session::{DashboardSession, SnapshotTab, Tab, TrendTab, WidgetChange};
pub use view::{render_view, RenderedView, View, ViewData};
