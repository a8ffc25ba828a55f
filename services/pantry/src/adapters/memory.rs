//! services/pantry/src/adapters/memory.rs
//!
//! An in-process implementation of the `ProgressRepository` port. Players are
//! kept in registration order, which is also the leaderboard tie-break order.

use async_trait::async_trait;
use pantry_core::domain::UserProgress;
use pantry_core::ports::{PlayerState, PortError, PortResult, ProgressRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    players: RwLock<Vec<PlayerState>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressStore {
    async fn create_player(&self, user_id: Uuid, name: &str) -> PortResult<PlayerState> {
        let mut players = self.players.write().await;
        if players.iter().any(|p| p.progress.user_id == user_id) {
            return Err(PortError::Conflict(format!("user {user_id} already exists")));
        }
        let state = PlayerState::new(user_id, name);
        players.push(state.clone());
        Ok(state)
    }

    async fn load_player(&self, user_id: Uuid) -> PortResult<PlayerState> {
        self.players
            .read()
            .await
            .iter()
            .find(|p| p.progress.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("user {user_id}")))
    }

    async fn save_player(&self, state: PlayerState) -> PortResult<()> {
        let mut players = self.players.write().await;
        let slot = players
            .iter_mut()
            .find(|p| p.progress.user_id == state.progress.user_id)
            .ok_or_else(|| PortError::NotFound(format!("user {}", state.progress.user_id)))?;
        *slot = state;
        Ok(())
    }

    async fn list_players(&self) -> PortResult<Vec<UserProgress>> {
        Ok(self
            .players
            .read()
            .await
            .iter()
            .map(|p| p.progress.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_load_save() {
        let store = InMemoryProgressStore::new();
        let id = Uuid::new_v4();
        store.create_player(id, "Ada").await.unwrap();
        assert!(matches!(
            store.create_player(id, "Ada again").await,
            Err(PortError::Conflict(_))
        ));

        let mut state = store.load_player(id).await.unwrap();
        state.progress.items_saved = 4;
        store.save_player(state).await.unwrap();
        assert_eq!(store.load_player(id).await.unwrap().progress.items_saved, 4);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let store = InMemoryProgressStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.load_player(id).await, Err(PortError::NotFound(_))));
        assert!(store.save_player(PlayerState::new(id, "ghost")).await.is_err());
    }

    #[tokio::test]
    async fn test_list_keeps_registration_order() {
        let store = InMemoryProgressStore::new();
        for name in ["c", "a", "b"] {
            store.create_player(Uuid::new_v4(), name).await.unwrap();
        }
        let names: Vec<String> = store
            .list_players()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
