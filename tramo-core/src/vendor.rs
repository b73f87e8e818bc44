use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::booking::{OfflineConfirmation, SeatMark, TicketOutcome, TicketRequest};
use crate::params::LegRequest;
use crate::seat::SeatMapEntry;
use crate::secret::Secret;
use crate::trip::{City, Trip, TripQuery};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            user: user.to_string(),
            password: Secret::from(password),
        }
    }
}

/// Operations exposed by the vendor's booking API.
///
/// Every call except `authenticate` needs a token. A vendor error envelope comes back
/// as `CoreError::VendorRequest` carrying the vendor's message.
#[async_trait]
pub trait VendorApi: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> CoreResult<String>;

    /// Raw trips for a route and date, unfiltered and with legs in vendor order.
    async fn list_trips(&self, token: &str, query: &TripQuery, company: &str)
        -> CoreResult<Vec<Trip>>;

    async fn get_seat_map(&self, token: &str, leg: &LegRequest) -> CoreResult<Vec<SeatMapEntry>>;

    /// Hold a seat on one leg.
    async fn mark_seat(&self, token: &str, mark: &SeatMark) -> CoreResult<()>;

    /// Release a held seat on one leg.
    async fn unmark_seat(&self, token: &str, mark: &SeatMark) -> CoreResult<()>;

    async fn create_ticket(&self, token: &str, request: &TicketRequest) -> CoreResult<TicketOutcome>;

    /// Finalize a ticket transaction created earlier by `create_ticket`.
    async fn confirm_offline_ticket(
        &self,
        token: &str,
        confirmation: &OfflineConfirmation,
    ) -> CoreResult<TicketOutcome>;

    async fn list_origins(&self, token: &str) -> CoreResult<Vec<City>>;

    async fn list_destinations(&self, token: &str, origin: &str) -> CoreResult<Vec<City>>;
}

#[derive(Default)]
struct MockState {
    trips: Vec<Trip>,
    trips_error: Option<String>,
    seat_maps: HashMap<String, Vec<SeatMapEntry>>,
    cities: Vec<City>,
    failing_reads: u32,
    failing_auth: bool,
    failing_marks: HashMap<(String, u32), String>,
    failing_unmarks: HashMap<(String, u32), String>,
    failing_tickets: HashMap<(String, u32), String>,
    failing_confirmations: HashMap<String, String>,
    minted: u32,
    authenticated_users: Vec<String>,
    calls: Vec<String>,
    ticket_requests: Vec<TicketRequest>,
    confirmations: Vec<OfflineConfirmation>,
}

/// In-memory vendor used in tests and local runs. Failures are scripted per route and seat.
#[derive(Default)]
pub struct MockVendorApi {
    state: Mutex<MockState>,
}

impl MockVendorApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_trips(self, trips: Vec<Trip>) -> Self {
        self.state().trips = trips;
        self
    }

    /// Make `list_trips` answer with an error envelope.
    pub fn with_trips_error(self, message: &str) -> Self {
        self.state().trips_error = Some(message.to_string());
        self
    }

    pub fn with_seat_map(self, route_code: &str, entries: Vec<SeatMapEntry>) -> Self {
        self.state().seat_maps.insert(route_code.to_string(), entries);
        self
    }

    pub fn with_cities(self, cities: Vec<City>) -> Self {
        self.state().cities = cities;
        self
    }

    /// The next `count` read calls (trips, seat maps) fail as if the token was rejected.
    pub fn fail_next_reads(self, count: u32) -> Self {
        self.state().failing_reads = count;
        self
    }

    pub fn fail_auth(self) -> Self {
        self.state().failing_auth = true;
        self
    }

    pub fn fail_mark(self, route_code: &str, seat: u32, message: &str) -> Self {
        self.state()
            .failing_marks
            .insert((route_code.to_string(), seat), message.to_string());
        self
    }

    pub fn fail_unmark(self, route_code: &str, seat: u32, message: &str) -> Self {
        self.state()
            .failing_unmarks
            .insert((route_code.to_string(), seat), message.to_string());
        self
    }

    pub fn fail_ticket(self, route_code: &str, seat: u32, message: &str) -> Self {
        self.state()
            .failing_tickets
            .insert((route_code.to_string(), seat), message.to_string());
        self
    }

    pub fn fail_confirmation(self, transaction_id: &str, message: &str) -> Self {
        self.state()
            .failing_confirmations
            .insert(transaction_id.to_string(), message.to_string());
        self
    }

    pub fn minted_tokens(&self) -> u32 {
        self.state().minted
    }

    pub fn authenticated_users(&self) -> Vec<String> {
        self.state().authenticated_users.clone()
    }

    /// Log of `operation:token:route:seat` entries for seat and ticket calls.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn ticket_requests(&self) -> Vec<TicketRequest> {
        self.state().ticket_requests.clone()
    }

    pub fn confirmations(&self) -> Vec<OfflineConfirmation> {
        self.state().confirmations.clone()
    }

    fn consume_read_failure(state: &mut MockState) -> CoreResult<()> {
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(CoreError::VendorRequest("token rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VendorApi for MockVendorApi {
    async fn authenticate(&self, credentials: &Credentials) -> CoreResult<String> {
        let mut state = self.state();
        if state.failing_auth {
            return Err(CoreError::VendorRequest("invalid credentials".to_string()));
        }
        state.minted += 1;
        state.authenticated_users.push(credentials.user.clone());
        Ok(format!("token-{}", state.minted))
    }

    async fn list_trips(
        &self,
        _token: &str,
        _query: &TripQuery,
        _company: &str,
    ) -> CoreResult<Vec<Trip>> {
        let mut state = self.state();
        Self::consume_read_failure(&mut state)?;
        if let Some(message) = &state.trips_error {
            return Err(CoreError::VendorRequest(message.clone()));
        }
        Ok(state.trips.clone())
    }

    async fn get_seat_map(&self, _token: &str, leg: &LegRequest) -> CoreResult<Vec<SeatMapEntry>> {
        let mut state = self.state();
        Self::consume_read_failure(&mut state)?;
        state
            .seat_maps
            .get(&leg.route_code)
            .cloned()
            .ok_or_else(|| CoreError::VendorRequest(format!("unknown route {}", leg.route_code)))
    }

    async fn mark_seat(&self, token: &str, mark: &SeatMark) -> CoreResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("mark:{}:{}:{}", token, mark.leg.route_code, mark.seat));
        match state.failing_marks.get(&(mark.leg.route_code.clone(), mark.seat)) {
            Some(message) => Err(CoreError::VendorRequest(message.clone())),
            None => Ok(()),
        }
    }

    async fn unmark_seat(&self, token: &str, mark: &SeatMark) -> CoreResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("unmark:{}:{}:{}", token, mark.leg.route_code, mark.seat));
        match state.failing_unmarks.get(&(mark.leg.route_code.clone(), mark.seat)) {
            Some(message) => Err(CoreError::VendorRequest(message.clone())),
            None => Ok(()),
        }
    }

    async fn create_ticket(&self, token: &str, request: &TicketRequest) -> CoreResult<TicketOutcome> {
        let mut state = self.state();
        state
            .calls
            .push(format!("ticket:{}:{}:{}", token, request.leg.route_code, request.seat));
        state.ticket_requests.push(request.clone());
        let key = (request.leg.route_code.clone(), request.seat);
        Ok(match state.failing_tickets.get(&key) {
            Some(message) => TicketOutcome::failed(message),
            None => TicketOutcome::issued(
                &format!("TK-{}-{}", request.leg.route_code, request.seat),
                &format!("TX-{}-{}", request.leg.route_code, request.seat),
            ),
        })
    }

    async fn confirm_offline_ticket(
        &self,
        token: &str,
        confirmation: &OfflineConfirmation,
    ) -> CoreResult<TicketOutcome> {
        let mut state = self.state();
        state.calls.push(format!(
            "confirm:{}:{}:{}",
            token, confirmation.reference_id, confirmation.transaction_id
        ));
        state.confirmations.push(confirmation.clone());
        Ok(match state.failing_confirmations.get(&confirmation.transaction_id) {
            Some(message) => TicketOutcome::failed(message),
            None => TicketOutcome::issued(
                &confirmation.transaction_id.replacen("TX-", "TK-", 1),
                &confirmation.transaction_id,
            ),
        })
    }

    async fn list_origins(&self, _token: &str) -> CoreResult<Vec<City>> {
        Ok(self.state().cities.clone())
    }

    async fn list_destinations(&self, _token: &str, origin: &str) -> CoreResult<Vec<City>> {
        Ok(self
            .state()
            .cities
            .iter()
            .filter(|city| city.code != origin)
            .cloned()
            .collect())
    }
}
