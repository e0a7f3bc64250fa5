use std::future::Future;

use crate::domain::{
    coach::value_objects::{ChatInput, ChatOutput},
    common::entities::app_errors::CoreError,
};

pub trait CoachService: Send + Sync {
    fn chat(&self, input: ChatInput) -> impl Future<Output = Result<ChatOutput, CoreError>> + Send;
}
