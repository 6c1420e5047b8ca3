use crate::dtos::{AdherenceDTO, MedicationDTO};
use serde::{Deserialize, Serialize};

pub mod add_medication {
    use super::*;
    use pillbox_domain::TimeOfDay;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub time_of_day: TimeOfDay,
        pub duration_days: i64,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub medication: MedicationDTO,
    }

    impl APIResponse {
        pub fn new(medication: MedicationDTO) -> Self {
            Self { medication }
        }
    }
}

pub mod get_medications {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub medications: Vec<MedicationDTO>,
    }

    impl APIResponse {
        pub fn new(medications: Vec<MedicationDTO>) -> Self {
            Self { medications }
        }
    }
}

pub mod clear_medications {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub deleted_count: usize,
    }

    impl APIResponse {
        pub fn new(deleted_count: usize) -> Self {
            Self { deleted_count }
        }
    }
}

pub mod get_adherence {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub adherence: Vec<AdherenceDTO>,
    }

    impl APIResponse {
        pub fn new(adherence: Vec<AdherenceDTO>) -> Self {
            Self { adherence }
        }
    }
}
