use token_core::types::UserProfile;

use super::{decode_rows, PROFILES_TABLE};
use crate::query::TableQuery;
use crate::traits::Backend;
use crate::Result;

pub struct ProfileRepository;

impl ProfileRepository {
    /// Get profile by user ID
    pub async fn get_by_id<B: Backend + ?Sized>(
        backend: &B,
        user_id: &str,
        auth: Option<&str>,
    ) -> Result<Option<UserProfile>> {
        let query = TableQuery::from(PROFILES_TABLE).eq("id", user_id).limit(1);
        let rows = backend.select(&query, auth).await?;
        Ok(decode_rows(PROFILES_TABLE, rows)?.into_iter().next())
    }
}
