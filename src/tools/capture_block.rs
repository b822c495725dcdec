use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CaptureBlockParams {
    #[schemars(description = "The note text. #hashtags become tags unless 'tags' is given.")]
    pub content: String,

    #[schemars(
        description = "Block type: 'work_log', 'journal', 'idea', or 'research'. Inferred from the text when omitted."
    )]
    pub r#type: Option<String>,

    #[schemars(
        description = "Explicit tags. Replaces hashtag extraction; an empty list stores no tags."
    )]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "People mentioned in the note")]
    pub people: Option<Vec<String>>,

    #[schemars(description = "Projects the note belongs to")]
    pub projects: Option<Vec<String>>,
}
