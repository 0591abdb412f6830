//! Scripted in-process transport for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::rpc::{Method, RpcRequest, RpcResponse, Transport};

type Reply = Box<dyn Fn(&RpcRequest) -> Result<RpcResponse>>;

/// Answers each method with a scripted reply and records every request
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: HashMap<Method, Reply>,
    calls: RefCell<Vec<RpcRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on<F>(mut self, method: Method, reply: F) -> Self
    where
        F: Fn(&RpcRequest) -> Result<RpcResponse> + 'static,
    {
        self.replies.insert(method, Box::new(reply));
        self
    }

    pub(crate) fn on_result(self, method: Method, result: Value) -> Self {
        self.on(method, move |_| Ok(RpcResponse::with_result(result.clone())))
    }

    pub(crate) fn calls(&self) -> Vec<RpcRequest> {
        self.calls.borrow().clone()
    }

    pub(crate) fn call_count(&self, method: Method) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

impl Transport for MockTransport {
    fn call(&self, request: &RpcRequest) -> Result<RpcResponse> {
        self.calls.borrow_mut().push(request.clone());
        match self.replies.get(&request.method) {
            Some(reply) => reply(request),
            None => Err(Error::Transport(format!(
                "no reply scripted for {}",
                request.method
            ))),
        }
    }
}
