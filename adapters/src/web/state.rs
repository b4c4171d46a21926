use std::sync::Arc;

use application::ports::in_::ExperimentService;

pub struct AppState {
    pub experiment: Arc<ExperimentService>,
    /// `None` disables the admin export.
    pub admin_password: Option<String>,
}

impl AppState {
    pub fn new(
        experiment: Arc<ExperimentService>,
        admin_password: Option<String>,
    ) -> Self {
        Self {
            experiment,
            admin_password,
        }
    }
}
