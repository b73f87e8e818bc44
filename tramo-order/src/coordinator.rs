use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tramo_core::booking::{
    BlockedSeat, ExtendedRecord, LegTransactions, OfflineConfirmation, PartialBlock, Passenger,
    PendingTicket, SeatMark, TentativeRecord, TicketRequest,
};
use tramo_core::fare::apply_discount;
use tramo_core::params::{LegParams, LegRequest};
use tramo_core::repository::BookingStateStore;
use tramo_core::secret::Secret;
use tramo_core::token::TokenSource;
use tramo_core::vendor::VendorApi;
use tramo_core::{CoreError, CoreResult};

use crate::discount::split_discount;
use crate::models::{BlockReceipt, BlockRequest, BookingLegs, Confirmation, ExtendReceipt, Release};
use crate::outcome::{failure_message, SeatOutcomes};
use crate::passenger::{nationality, split_name};
use crate::reference::allocate_reference_ids;

/// How long each stage of a booking is held before the store lets it expire.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    pub block_duration: Duration,
    pub extended_duration: Duration,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            block_duration: Duration::from_secs(15 * 60),
            extended_duration: Duration::from_secs(30 * 60),
        }
    }
}

/// Drives a transaction through block, extend, confirm and unblock.
///
/// Nothing is kept between calls: each step reads and writes the booking state store,
/// whose TTLs enforce the hold windows.
pub struct BookingCoordinator {
    vendor: Arc<dyn VendorApi>,
    tokens: Arc<TokenSource>,
    store: Arc<dyn BookingStateStore>,
    policy: BookingPolicy,
}

impl BookingCoordinator {
    pub fn new(
        vendor: Arc<dyn VendorApi>,
        tokens: Arc<TokenSource>,
        store: Arc<dyn BookingStateStore>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            vendor,
            tokens,
            store,
            policy,
        }
    }

    /// Hold the requested seats on every leg.
    ///
    /// Stops at the first seat the vendor refuses; seats held until then stay held and
    /// are listed in the `PartialBlock` error.
    pub async fn block(&self, transaction_id: &str, request: &BlockRequest) -> CoreResult<BlockReceipt> {
        validate_block(request)?;
        let legs = request.params.decode()?;

        let token = self.tokens.mint(request.whitelabel.as_deref()).await?;
        let record = TentativeRecord {
            token: Secret::new(token.clone()),
            seats: request.seats.clone(),
            passengers: request.passengers.clone(),
            whitelabel: request.whitelabel.clone(),
        };
        self.store
            .put_tentative(transaction_id, &record, self.policy.block_duration)
            .await?;

        let mut blocked = Vec::new();
        for (index, leg) in legs.iter().enumerate() {
            for &seat in &request.seats {
                let mark = SeatMark {
                    leg: leg.clone(),
                    seat,
                };
                if let Err(e) = self.vendor.mark_seat(&token, &mark).await {
                    let failed = BlockedSeat { leg: index, seat };
                    warn!(
                        "Transaction {}: seat {} on leg {} not blocked: {}",
                        transaction_id, seat, index, e
                    );
                    return Err(CoreError::PartialBlock(PartialBlock {
                        blocked,
                        failed,
                        message: failure_message(&e),
                    }));
                }
                blocked.push(BlockedSeat { leg: index, seat });
            }
        }

        info!(
            "Transaction {}: blocked seats {:?} on {} leg(s)",
            transaction_id,
            request.seats,
            legs.len()
        );
        Ok(BlockReceipt {
            transaction_id: transaction_id.to_string(),
            seats: request.seats.clone(),
            expires_in_seconds: self.policy.block_duration.as_secs(),
        })
    }

    /// Create the vendor ticket transactions for held seats, to be confirmed offline later.
    ///
    /// A transaction that is already extended keeps its ticket transactions and reference ids.
    pub async fn extend(&self, transaction_id: &str, booking: &BookingLegs) -> CoreResult<ExtendReceipt> {
        if let Some(existing) = self.store.get_extended(transaction_id).await? {
            info!("Transaction {}: already extended, reusing its references", transaction_id);
            return Ok(ExtendReceipt {
                transaction_id: transaction_id.to_string(),
                reference_ids: existing.reference_ids().into_iter().map(str::to_string).collect(),
                expires_in_seconds: self.policy.extended_duration.as_secs(),
            });
        }

        let tentative = self.store.get_tentative(transaction_id).await?.ok_or_else(|| {
            CoreError::StateMissing(format!("extension data not found for {}", transaction_id))
        })?;
        let legs = booking.params.decode()?;
        let reference_ids = allocate_reference_ids(transaction_id, legs.len(), &mut rand::thread_rng());
        let tickets = build_tickets(&legs, booking, &tentative.passengers, &reference_ids);
        let token = tentative.token.expose();

        let mut record = ExtendedRecord {
            whitelabel: tentative.whitelabel.clone(),
            legs: Vec::with_capacity(legs.len()),
        };
        for (reference_id, requests) in reference_ids.iter().zip(tickets) {
            let mut pending = Vec::with_capacity(requests.len());
            for request in requests {
                let outcome = self.vendor.create_ticket(token, &request).await?;
                if let Some(message) = outcome.error_message() {
                    warn!(
                        "Transaction {}: ticket for seat {} refused: {}",
                        transaction_id, request.seat, message
                    );
                    return Err(CoreError::VendorRequest(message.to_string()));
                }
                let ticket_transaction = outcome.transaction_id.ok_or_else(|| {
                    CoreError::VendorRequest(format!(
                        "no ticket transaction returned for seat {}",
                        request.seat
                    ))
                })?;
                pending.push(PendingTicket {
                    seat: request.seat,
                    transaction_id: ticket_transaction,
                });
            }
            record.legs.push(LegTransactions {
                reference_id: reference_id.clone(),
                tickets: pending,
            });
        }

        self.store
            .put_extended(transaction_id, &record, self.policy.extended_duration)
            .await?;
        info!("Transaction {}: extended with references {:?}", transaction_id, reference_ids);

        Ok(ExtendReceipt {
            transaction_id: transaction_id.to_string(),
            reference_ids,
            expires_in_seconds: self.policy.extended_duration.as_secs(),
        })
    }

    /// Issue tickets: offline when the booking was extended, online from the hold otherwise.
    pub async fn confirm(&self, transaction_id: &str, booking: &BookingLegs) -> CoreResult<Confirmation> {
        let outcomes = match self.store.get_extended(transaction_id).await? {
            Some(extended) => self.confirm_offline(extended).await?,
            None => {
                let tentative = self.store.get_tentative(transaction_id).await?.ok_or_else(|| {
                    CoreError::StateMissing(format!("tentative data not found for {}", transaction_id))
                })?;
                self.confirm_online(transaction_id, tentative, booking).await?
            }
        };

        let seats = outcomes.into_confirmation().map_err(|partial| {
            warn!("Transaction {}: partial confirmation: {}", transaction_id, partial);
            CoreError::PartialConfirm(partial)
        })?;
        info!("Transaction {}: confirmed {} seat(s)", transaction_id, seats.len());

        Ok(Confirmation {
            transaction_id: transaction_id.to_string(),
            seats,
        })
    }

    async fn confirm_offline(&self, extended: ExtendedRecord) -> CoreResult<SeatOutcomes> {
        let token = self.tokens.mint(extended.whitelabel.as_deref()).await?;
        let mut outcomes = SeatOutcomes::new();
        for leg in &extended.legs {
            for ticket in &leg.tickets {
                let confirmation = OfflineConfirmation {
                    reference_id: leg.reference_id.clone(),
                    transaction_id: ticket.transaction_id.clone(),
                };
                let outcome = self.vendor.confirm_offline_ticket(&token, &confirmation).await;
                outcomes.record_ticket(ticket.seat, outcome);
            }
        }
        Ok(outcomes)
    }

    async fn confirm_online(
        &self,
        transaction_id: &str,
        tentative: TentativeRecord,
        booking: &BookingLegs,
    ) -> CoreResult<SeatOutcomes> {
        let legs = booking.params.decode()?;
        let reference_ids = allocate_reference_ids(transaction_id, legs.len(), &mut rand::thread_rng());
        let tickets = build_tickets(&legs, booking, &tentative.passengers, &reference_ids);
        let token = tentative.token.expose();

        let mut outcomes = SeatOutcomes::new();
        for request in tickets.iter().flatten() {
            let outcome = self.vendor.create_ticket(token, request).await;
            outcomes.record_ticket(request.seat, outcome);
        }
        Ok(outcomes)
    }

    /// Release every held seat on every leg. The hold is dropped only when all seats are free.
    pub async fn unblock(&self, transaction_id: &str, params: &LegParams) -> CoreResult<Release> {
        let tentative = self.store.get_tentative(transaction_id).await?.ok_or_else(|| {
            CoreError::StateMissing(format!("tentative data not found for {}", transaction_id))
        })?;
        let legs = params.decode()?;
        let token = tentative.token.expose();

        let mut outcomes = SeatOutcomes::new();
        for leg in &legs {
            for &seat in &tentative.seats {
                let mark = SeatMark {
                    leg: leg.clone(),
                    seat,
                };
                let result = self
                    .vendor
                    .unmark_seat(token, &mark)
                    .await
                    .map(|_| String::new())
                    .map_err(|e| failure_message(&e));
                outcomes.record(seat, result);
            }
        }

        let released = outcomes.into_release().map_err(|partial| {
            warn!("Transaction {}: partial release: {}", transaction_id, partial);
            CoreError::PartialUnblock(partial)
        })?;
        self.store.delete_tentative(transaction_id).await?;
        info!("Transaction {}: released seats {:?}", transaction_id, released);

        Ok(Release {
            transaction_id: transaction_id.to_string(),
            released,
        })
    }

    pub async fn cancel(&self, transaction_id: &str) -> CoreResult<()> {
        Err(CoreError::Unsupported(format!(
            "cancellation of {} is handled by the vendor",
            transaction_id
        )))
    }
}

fn validate_block(request: &BlockRequest) -> CoreResult<()> {
    if request.seats.is_empty() {
        return Err(CoreError::ValidationError("no seats to block".to_string()));
    }
    if let Some(passenger) = request
        .passengers
        .iter()
        .find(|passenger| !request.seats.contains(&passenger.seat))
    {
        return Err(CoreError::ValidationError(format!(
            "passenger seat {} is not among the requested seats",
            passenger.seat
        )));
    }
    Ok(())
}

/// Ticket requests grouped by leg, one per passenger.
fn build_tickets(
    legs: &[LegRequest],
    booking: &BookingLegs,
    passengers: &[Passenger],
    reference_ids: &[String],
) -> Vec<Vec<TicketRequest>> {
    let mut per_leg: Vec<Vec<TicketRequest>> = legs.iter().map(|_| Vec::new()).collect();

    for passenger in passengers {
        let fares: Vec<i64> = legs
            .iter()
            .enumerate()
            .map(|(index, leg)| apply_discount(leg.fare, booking.seat_discount(index, passenger.seat)))
            .collect();
        let shares = split_discount(passenger.discount(), &fares);
        let name = split_name(&passenger.first_name, &passenger.last_name);
        let nationality = nationality(passenger);

        for (index, leg) in legs.iter().enumerate() {
            per_leg[index].push(TicketRequest {
                reference_id: reference_ids[index].clone(),
                leg: leg.clone(),
                seat: passenger.seat,
                name: name.clone(),
                document_type: passenger.document_type.clone(),
                document_number: passenger.document_number.clone(),
                nationality: nationality.clone(),
                fare: fares[index],
                discount: shares[index],
            });
        }
    }
    per_leg
}
