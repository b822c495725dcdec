use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FindRelatedParams {
    #[schemars(description = "ID of the block to find neighbours for (b_...)")]
    pub id: String,

    #[schemars(description = "Maximum number of related blocks. Defaults to 10.")]
    pub limit: Option<usize>,
}
