//! 会话存储 - 存储层
//!
//! 所有读写都经过同一个异步互斥锁串行化，
//! 避免"最后写入者覆盖"的并发问题。消息列表只追加不修改。

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::session::{ChatMessage, ChatSession};

/// 会话仓库接口
///
/// 存储后端可注入：生产用 JSON 文件，测试用内存。
pub trait SessionStore {
    /// 创建新会话
    fn create_session(
        &self,
        title: &str,
    ) -> impl std::future::Future<Output = AppResult<ChatSession>> + Send;

    /// 向会话追加一条消息
    fn append_message(
        &self,
        session_id: Uuid,
        message: ChatMessage,
    ) -> impl std::future::Future<Output = AppResult<()>> + Send;

    /// 读取单个会话
    fn get_session(
        &self,
        session_id: Uuid,
    ) -> impl std::future::Future<Output = AppResult<Option<ChatSession>>> + Send;

    /// 列出全部会话，按创建时间倒序
    fn list_sessions(&self) -> impl std::future::Future<Output = AppResult<Vec<ChatSession>>> + Send;
}

// ========== JSON 文件后端 ==========

/// JSON 文件会话存储
///
/// 打开时整体加载，每次写操作持锁落盘（先写临时文件再改名）。
pub struct JsonFileStore {
    path: PathBuf,
    sessions: Mutex<HashMap<Uuid, ChatSession>>,
}

impl JsonFileStore {
    /// 打开（或新建）一个会话存储文件
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let sessions = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| AppError::store_io(path.display().to_string(), e))?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            sessions: Mutex::new(sessions),
        })
    }

    /// 持锁落盘
    fn persist(&self, sessions: &HashMap<Uuid, ChatSession>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::store_io(parent.display().to_string(), e))?;
            }
        }

        let content = serde_json::to_string_pretty(sessions)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| AppError::store_io(tmp.display().to_string(), e))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::store_io(self.path.display().to_string(), e))?;
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    async fn create_session(&self, title: &str) -> AppResult<ChatSession> {
        let session = ChatSession::new(title);
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id, session.clone());
        self.persist(&sessions)?;
        Ok(session)
    }

    async fn append_message(&self, session_id: Uuid, message: ChatMessage) -> AppResult<()> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::SessionNotFound {
                id: session_id.to_string(),
            })?;
        session.messages.push(message);
        self.persist(&sessions)?;
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> AppResult<Option<ChatSession>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(&session_id).cloned())
    }

    async fn list_sessions(&self) -> AppResult<Vec<ChatSession>> {
        let sessions = self.sessions.lock().await;
        let mut list: Vec<ChatSession> = sessions.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

// ========== 内存后端 ==========

/// 内存会话存储，测试用
pub struct MemoryStore {
    sessions: Mutex<HashMap<Uuid, ChatSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemoryStore {
    async fn create_session(&self, title: &str) -> AppResult<ChatSession> {
        let session = ChatSession::new(title);
        self.sessions
            .lock()
            .await
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn append_message(&self, session_id: Uuid, message: ChatMessage) -> AppResult<()> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::SessionNotFound {
                id: session_id.to_string(),
            })?;
        session.messages.push(message);
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> AppResult<Option<ChatSession>> {
        Ok(self.sessions.lock().await.get(&session_id).cloned())
    }

    async fn list_sessions(&self) -> AppResult<Vec<ChatSession>> {
        let sessions = self.sessions.lock().await;
        let mut list: Vec<ChatSession> = sessions.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}
