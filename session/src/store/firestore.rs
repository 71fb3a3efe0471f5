//! Firestore REST backend. Each user owns `chats/{uid}/conversations`, one
//! document per conversation holding `conversationId`, `title`, `createdAt`,
//! `lastUpdated` and the `messages` array.

use super::ConversationStore;
use crate::error::Error;
use crate::identity::AuthUser;
use crate::model::{Conversation, ConversationId, Message, Sender, DEFAULT_TITLE};
use ::reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Response};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1/";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Value {
    NullValue(Option<()>),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(DateTime<Utc>),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocuments {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

fn string(value: impl Into<String>) -> Value {
    Value::StringValue(value.into())
}

fn encode_message(message: &Message) -> Value {
    let sender = match message.sender {
        Sender::User => "user",
        Sender::Bot => "bot",
    };
    let mut fields = BTreeMap::new();
    fields.insert("sender".to_owned(), string(sender));
    fields.insert("text".to_owned(), string(&message.text));
    fields.insert(
        "timestamp".to_owned(),
        string(message.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    if message.error {
        fields.insert("error".to_owned(), Value::BooleanValue(true));
    }
    Value::MapValue(MapValue { fields })
}

fn encode_messages(messages: &[Message]) -> Value {
    Value::ArrayValue(ArrayValue {
        values: messages.iter().map(encode_message).collect(),
    })
}

fn decode_message(value: &Value) -> Option<Message> {
    let Value::MapValue(map) = value else {
        return None;
    };
    let text = |key: &str| match map.fields.get(key) {
        Some(Value::StringValue(s)) => Some(s.as_str()),
        _ => None,
    };
    let sender = match text("sender")? {
        "user" => Sender::User,
        "bot" => Sender::Bot,
        _ => return None,
    };
    let timestamp = match map.fields.get("timestamp") {
        Some(Value::StringValue(s)) => DateTime::parse_from_rfc3339(s).ok()?.with_timezone(&Utc),
        Some(Value::TimestampValue(t)) => *t,
        _ => return None,
    };
    let error = matches!(map.fields.get("error"), Some(Value::BooleanValue(true)));
    Some(Message {
        sender,
        text: text("text")?.to_owned(),
        timestamp,
        error,
    })
}

fn decode_messages(fields: &BTreeMap<String, Value>) -> Vec<Message> {
    let Some(Value::ArrayValue(array)) = fields.get("messages") else {
        return vec![];
    };
    array
        .values
        .iter()
        .filter_map(|value| {
            let message = decode_message(value);
            if message.is_none() {
                warn!("Skipping malformed message {value:?}");
            }
            message
        })
        .collect()
}

fn timestamp(fields: &BTreeMap<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    match fields.get(key) {
        Some(Value::TimestampValue(t)) => Some(*t),
        _ => None,
    }
}

fn decode_conversation(document: Document) -> Result<Conversation, Error> {
    let name = document
        .name
        .ok_or_else(|| Error::Document("document without a name".to_owned()))?;
    let id = name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Document(name.clone()))?;
    let fields = document.fields;
    let title = match fields.get("title") {
        Some(Value::StringValue(title)) => title.clone(),
        _ => DEFAULT_TITLE.to_owned(),
    };
    let created_at = timestamp(&fields, "createdAt").unwrap_or_else(Utc::now);
    let last_updated = timestamp(&fields, "lastUpdated").unwrap_or(created_at);
    Ok(Conversation {
        id: ConversationId::new(id),
        title,
        created_at,
        last_updated,
        messages: decode_messages(&fields),
    })
}

async fn check(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(Error::Storage {
            status: status.as_u16(),
            body,
        })
    }
}

pub struct FirestoreStore {
    client: ::reqwest::Client,
    documents: Url,
}

impl FirestoreStore {
    pub fn new(project_id: &str) -> Result<Self, Error> {
        Self::with_base_url(FIRESTORE_URL, project_id)
    }

    pub fn with_base_url(base_url: &str, project_id: &str) -> Result<Self, Error> {
        let documents = Url::parse(base_url)?.join(&format!(
            "projects/{project_id}/databases/(default)/documents/"
        ))?;
        Ok(Self {
            client: ::reqwest::Client::new(),
            documents,
        })
    }

    fn collection(&self, owner: &AuthUser) -> Result<Url, Error> {
        Ok(self
            .documents
            .join(&format!("chats/{}/conversations", owner.uid))?)
    }

    fn document(&self, owner: &AuthUser, id: &ConversationId) -> Result<Url, Error> {
        Ok(self
            .documents
            .join(&format!("chats/{}/conversations/{id}", owner.uid))?)
    }

    fn request(&self, method: Method, url: Url, owner: &AuthUser) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &owner.id_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn patch(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
        fields: BTreeMap<String, Value>,
    ) -> Result<(), Error> {
        let mut query: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.clone()))
            .collect();
        query.push(("currentDocument.exists", "true".to_owned()));
        let document = Document { name: None, fields };
        let res = self
            .request(Method::PATCH, self.document(owner, id)?, owner)
            .query(&query)
            .json(&document)
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl ConversationStore for FirestoreStore {
    async fn list(&self, owner: &AuthUser) -> Result<Vec<Conversation>, Error> {
        let url = self.collection(owner)?;
        let mut conversations = vec![];
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("orderBy", "lastUpdated desc"), ("pageSize", PAGE_SIZE)];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.as_str()));
            }
            let res = self
                .request(Method::GET, url.clone(), owner)
                .query(&query)
                .send()
                .await?;
            let page: ListDocuments = check(res).await?.json().await?;
            for document in page.documents {
                conversations.push(decode_conversation(document)?);
            }
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(conversations)
    }

    async fn create(&self, owner: &AuthUser, now: DateTime<Utc>) -> Result<Conversation, Error> {
        // The id is chosen here so the document can carry it as a field.
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut fields = BTreeMap::new();
        fields.insert("conversationId".to_owned(), string(&id));
        fields.insert("title".to_owned(), string(DEFAULT_TITLE));
        fields.insert("createdAt".to_owned(), Value::TimestampValue(now));
        fields.insert("lastUpdated".to_owned(), Value::TimestampValue(now));
        fields.insert("messages".to_owned(), encode_messages(&[]));
        let document = Document { name: None, fields };
        let res = self
            .request(Method::POST, self.collection(owner)?, owner)
            .query(&[("documentId", &id)])
            .json(&document)
            .send()
            .await?;
        let created: Document = check(res).await?.json().await?;
        let conversation = decode_conversation(created)?;
        info!("Created conversation {}", conversation.id);
        Ok(conversation)
    }

    async fn load_messages(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
    ) -> Result<Vec<Message>, Error> {
        let res = self
            .request(Method::GET, self.document(owner, id)?, owner)
            .send()
            .await?;
        let document: Document = check(res).await?.json().await?;
        Ok(decode_messages(&document.fields))
    }

    async fn save_messages(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
        messages: &[Message],
        at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut fields = BTreeMap::new();
        fields.insert("messages".to_owned(), encode_messages(messages));
        fields.insert("lastUpdated".to_owned(), Value::TimestampValue(at));
        self.patch(owner, id, fields).await
    }

    async fn rename(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
        title: &str,
    ) -> Result<(), Error> {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_owned(), string(title));
        self.patch(owner, id, fields).await
    }

    async fn delete(&self, owner: &AuthUser, id: &ConversationId) -> Result<(), Error> {
        let res = self
            .request(Method::DELETE, self.document(owner, id)?, owner)
            .send()
            .await?;
        check(res).await?;
        info!("Deleted conversation {id}");
        Ok(())
    }
}
