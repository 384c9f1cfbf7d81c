use std::sync::Arc;

use kgraph_core::{BackingService, ServiceError};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::tui_event::{Command, CommandPayload, CommandRequest, Completion, Event};

/// Runs commands against the backing service off the event loop and feeds
/// each result back as exactly one [`Event::CommandCompleted`].
///
/// There is no cancellation: every scheduled command runs to completion and
/// screens ignore results they are no longer waiting for.
#[derive(Clone)]
pub struct Scheduler {
    service: Arc<dyn BackingService>,
    events: UnboundedSender<Event>,
}

impl Scheduler {
    pub fn new(service: Arc<dyn BackingService>, events: UnboundedSender<Event>) -> Self {
        Self { service, events }
    }

    pub fn schedule(&self, command: Command) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        let Command { tag, request } = command;
        let name = request.name();
        tracing::debug!(screen = tag.screen.0, seq = tag.seq, command = name, "scheduling");

        tokio::spawn(async move {
            let outcome =
                match tokio::task::spawn_blocking(move || execute(service.as_ref(), request)).await
                {
                    Ok(outcome) => outcome,
                    Err(e) => Err(ServiceError::Failed(format!("{name} did not finish: {e}"))),
                };
            if let Err(e) = &outcome {
                tracing::warn!(command = name, error = %e, "command failed");
            }
            if events
                .send(Event::CommandCompleted(Completion { tag, outcome }))
                .is_err()
            {
                tracing::debug!(command = name, "event loop gone, dropping completion");
            }
        })
    }
}

/// Perform one request synchronously.
pub fn execute(
    service: &dyn BackingService,
    request: CommandRequest,
) -> Result<CommandPayload, ServiceError> {
    match request {
        CommandRequest::CreateRecord(new) => service.create_record(new).map(CommandPayload::Created),
        CommandRequest::CreateRecords(batch) => batch
            .into_iter()
            .map(|new| service.create_record(new))
            .collect::<Result<Vec<_>, _>>()
            .map(CommandPayload::CreatedMany),
        CommandRequest::Search(query) => service.search(&query).map(CommandPayload::Hits),
        CommandRequest::GetRecord(id) => service.get_record(&id).map(CommandPayload::Fetched),
        CommandRequest::GenerateFlashcards(id) => service
            .generate_flashcards(&id)
            .map(CommandPayload::Flashcards),
        CommandRequest::Publish => service.publish().map(CommandPayload::Published),
    }
}
