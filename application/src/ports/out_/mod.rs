mod gateway;
mod session;

pub use gateway::{ActionRecord, ExperimentGateway, GatewayError, ResultRecord, SurveyRecord};
pub use session::SessionRepository;
