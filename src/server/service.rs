use super::request::parse_request;
use super::response::write_outcome;
use crate::dispatcher::{Dispatcher, RequestContext};
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;

/// The `HttpService` glue: one instance is cloned per connection by the
/// runtime, all clones sharing the dispatcher.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parts = match parse_request(req) {
            Ok(parts) => parts,
            Err(err) => {
                write_outcome(res, err.into_outcome());
                return Ok(());
            }
        };
        let mut ctx = RequestContext::new(parts);
        let outcome = self.dispatcher.dispatch(&mut ctx);
        write_outcome(res, outcome);
        Ok(())
    }
}
