use serde::{Deserialize, Serialize};

pub mod record_response {
    use super::*;
    use pillbox_domain::{Adherence, ResponseOutcome};

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub medication_name: String,
        pub outcome: ResponseOutcome,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub medication_name: String,
        pub taken: u32,
        pub skipped: u32,
    }

    impl APIResponse {
        pub fn new(medication_name: String, adherence: Adherence) -> Self {
            Self {
                medication_name,
                taken: adherence.taken,
                skipped: adherence.skipped,
            }
        }
    }
}
