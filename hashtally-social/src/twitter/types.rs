use serde::{Deserialize, Serialize};

/// `GET 1.1/users/show.json` payload, reduced to the fields hashtally reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub screen_name: String,
    pub followers_count: u64,
    pub statuses_count: u64,
    #[serde(default)]
    pub protected: Option<bool>,
}

/// One element of `GET 1.1/statuses/user_timeline.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: u64,
    /// Twitter's classic format, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
    pub created_at: String,

    #[serde(default)]
    pub entities: Option<Entities>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<HashTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashTag {
    pub text: String,
    #[serde(default)]
    pub indices: Option<[u32; 2]>,
}
