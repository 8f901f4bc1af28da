use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use engivia_core::{
    Broadcast, BroadcastFields, BroadcastId, BroadcastPatch, BroadcastStore, EmbedUrl, Engivia,
    EngiviaId, EngiviaStore, NewEngivia, PostUser, Session, StoreError, User, UserId, UserStore,
};

/// A store call as observed by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(BroadcastFields),
    Update(BroadcastId, BroadcastPatch),
    Delete(BroadcastId),
    SetYoutubeUrl(BroadcastId, String),
    PostEngivia(NewEngivia),
    UpdateUsername(UserId, String),
    RefreshSession,
    ResumeSession,
}

/// In-memory store that records every write.
#[derive(Default)]
pub struct MemoryStore {
    pub broadcasts: RefCell<BTreeMap<BroadcastId, Broadcast>>,
    pub engivias: RefCell<Vec<Engivia>>,
    pub users: RefCell<BTreeMap<UserId, User>>,
    pub session: RefCell<Option<Session>>,
    pub calls: RefCell<Vec<Call>>,
    pub fail_writes: RefCell<Option<StoreError>>,
}

impl MemoryStore {
    pub fn with_broadcast(self, broadcast: Broadcast) -> Self {
        self.broadcasts
            .borrow_mut()
            .insert(broadcast.id.clone(), broadcast);
        self
    }

    pub fn with_session(self, session: Session) -> Self {
        self.users
            .borrow_mut()
            .insert(session.user.id.clone(), session.user.clone());
        *self.session.borrow_mut() = Some(session);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(call);
        match self.fail_writes.borrow().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl BroadcastStore for MemoryStore {
    async fn create_broadcast(&self, fields: BroadcastFields) -> Result<Broadcast, StoreError> {
        self.record(Call::Create(fields.clone()))?;
        let broadcast = Broadcast {
            id: BroadcastId::generate(),
            title: fields.title,
            broad_casting_date: fields.broad_casting_date,
            broad_cast_url: None,
        };
        self.broadcasts
            .borrow_mut()
            .insert(broadcast.id.clone(), broadcast.clone());
        Ok(broadcast)
    }

    async fn update_broadcast(
        &self,
        id: &BroadcastId,
        patch: BroadcastPatch,
    ) -> Result<Broadcast, StoreError> {
        self.record(Call::Update(id.clone(), patch.clone()))?;
        let mut broadcasts = self.broadcasts.borrow_mut();
        let broadcast = broadcasts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(broadcast);
        Ok(broadcast.clone())
    }

    async fn delete_broadcast(&self, id: &BroadcastId) -> Result<(), StoreError> {
        self.record(Call::Delete(id.clone()))?;
        self.broadcasts.borrow_mut().remove(id);
        Ok(())
    }

    async fn set_youtube_url(
        &self,
        id: &BroadcastId,
        url: EmbedUrl,
    ) -> Result<Broadcast, StoreError> {
        self.record(Call::SetYoutubeUrl(id.clone(), url.to_string()))?;
        let mut broadcasts = self.broadcasts.borrow_mut();
        let broadcast = broadcasts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        broadcast.broad_cast_url = Some(url);
        Ok(broadcast.clone())
    }

    async fn get_broadcast(&self, id: &BroadcastId) -> Result<Broadcast, StoreError> {
        self.broadcasts
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_broadcasts(&self) -> Result<Vec<Broadcast>, StoreError> {
        Ok(self.broadcasts.borrow().values().cloned().collect())
    }
}

impl EngiviaStore for MemoryStore {
    async fn get_engivias(&self, broadcast_id: &BroadcastId) -> Result<Vec<Engivia>, StoreError> {
        Ok(self
            .engivias
            .borrow()
            .iter()
            .filter(|e| &e.broadcast_id == broadcast_id)
            .cloned()
            .collect())
    }

    async fn post_engivia(&self, engivia: NewEngivia) -> Result<Engivia, StoreError> {
        self.record(Call::PostEngivia(engivia.clone()))?;
        let session = self.session.borrow();
        let user = &session
            .as_ref()
            .ok_or_else(|| StoreError::Unauthorized("signed out".into()))?
            .user;
        let stored = Engivia {
            id: EngiviaId::generate(),
            broadcast_id: engivia.broadcast_id,
            engivia_number: None,
            body: engivia.body,
            post_user: PostUser::from(user),
            created_at: Utc::now(),
        };
        self.engivias.borrow_mut().push(stored.clone());
        Ok(stored)
    }
}

impl UserStore for MemoryStore {
    async fn update_username(&self, user_id: &UserId, name: &str) -> Result<User, StoreError> {
        self.record(Call::UpdateUsername(user_id.clone(), name.to_string()))?;
        let mut users = self.users.borrow_mut();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        user.name = name.to_string();
        Ok(user.clone())
    }

    async fn refresh_session(&self) -> Result<Session, StoreError> {
        self.calls.borrow_mut().push(Call::RefreshSession);
        let mut session = self.session.borrow_mut();
        let current = session
            .as_mut()
            .ok_or_else(|| StoreError::Unauthorized("signed out".into()))?;
        if let Some(user) = self.users.borrow().get(&current.user.id) {
            current.user = user.clone();
        }
        Ok(current.clone())
    }

    async fn resume_session(&self) -> Result<Option<Session>, StoreError> {
        self.record(Call::ResumeSession)?;
        Ok(self.session.borrow().clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn broadcast(id: &str, title: &str) -> Broadcast {
    Broadcast {
        id: BroadcastId::parse(id).unwrap(),
        title: title.to_string(),
        broad_casting_date: date(2024, 1, 1),
        broad_cast_url: None,
    }
}

pub fn session(is_admin: bool) -> Session {
    Session {
        token: "token".into(),
        user: User {
            id: UserId::new("U123"),
            name: "engineer".into(),
            image: "https://example.com/avatar.png".into(),
            is_admin,
        },
        expires_at: Utc::now() + Duration::hours(1),
    }
}
