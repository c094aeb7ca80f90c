use async_trait::async_trait;
use campus_voice::{Agent, AgentApi, CreateAgent, Error, UpdateAgent};
use http::StatusCode;
use serde_json::{Value, json};
use std::sync::Mutex;

/// In-memory stand-in for the voice vendor.
#[derive(Default)]
pub struct FakeAgentApi {
    pub fail: bool,
    pub created: Mutex<Vec<CreateAgent>>,
    pub updated: Mutex<Vec<(String, UpdateAgent)>>,
    pub deleted: Mutex<Vec<String>>,
    pub ended: Mutex<Vec<String>>,
}

impl FakeAgentApi {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), Error> {
        if self.fail {
            return Err(Error::StatusCode {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "vendor unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AgentApi for FakeAgentApi {
    async fn create_agent(&self, agent: &CreateAgent) -> Result<Agent, Error> {
        self.check()?;
        let mut created = self.created.lock().unwrap();
        created.push(agent.clone());
        Ok(Agent {
            id: format!("agent_{}", created.len()),
            name: Some(agent.name.clone()),
            voice: Some(agent.voice.clone()),
        })
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, Error> {
        self.check()?;
        Ok(Agent {
            id: agent_id.to_owned(),
            name: None,
            voice: None,
        })
    }

    async fn update_agent(&self, agent_id: &str, update: &UpdateAgent) -> Result<Agent, Error> {
        self.check()?;
        self.updated.lock().unwrap().push((agent_id.to_owned(), update.clone()));
        Ok(Agent {
            id: agent_id.to_owned(),
            name: update.name.clone(),
            voice: update.voice.clone(),
        })
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), Error> {
        self.check()?;
        self.deleted.lock().unwrap().push(agent_id.to_owned());
        Ok(())
    }

    async fn get_call(&self, call_id: &str) -> Result<Value, Error> {
        self.check()?;
        Ok(json!({"call_id": call_id, "call_status": "ongoing"}))
    }

    async fn list_calls(&self, agent_id: Option<&str>, limit: u32) -> Result<Vec<Value>, Error> {
        self.check()?;
        Ok((0..limit.min(2))
            .map(|i| json!({"call_id": format!("call_{i}"), "agent_id": agent_id}))
            .collect())
    }

    async fn end_call(&self, call_id: &str) -> Result<Value, Error> {
        self.check()?;
        self.ended.lock().unwrap().push(call_id.to_owned());
        Ok(Value::Null)
    }
}
