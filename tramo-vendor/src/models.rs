//! Wire shapes of the vendor API.

use serde::{Deserialize, Serialize};
use tramo_core::booking::{OfflineConfirmation, TicketOutcome, TicketRequest};
use tramo_core::params::LegRequest;
use tramo_core::seat::SeatMapEntry;
use tramo_core::trip::{City, Leg, Trip};

/// Failure envelope the vendor may send in place of any response body.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: serde_json::Value,
    pub message: String,
}

impl ErrorEnvelope {
    /// `error` is `true` or a non-empty code on failure.
    pub fn is_failure(&self) -> bool {
        match &self.error {
            serde_json::Value::Bool(flag) => *flag,
            serde_json::Value::String(code) => !code.is_empty(),
            serde_json::Value::Number(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub user: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TripSearchRequest<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    /// `dd/mm/yyyy`
    pub date: String,
    pub company: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TripSearchResponse {
    #[serde(default)]
    pub services: Vec<ServiceDto>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceDto {
    pub legs: Vec<LegDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegDto {
    pub origin: String,
    pub destination: String,
    pub company: String,
    pub route: String,
    pub hour: String,
    #[serde(default)]
    pub additional_fare: bool,
    pub departure: String,
    pub arrival: String,
    pub fare: i64,
    #[serde(default)]
    pub available_seats: u32,
    #[serde(default)]
    pub occupied_seats: u32,
}

impl From<LegDto> for Leg {
    fn from(dto: LegDto) -> Self {
        Self {
            origin: dto.origin,
            destination: dto.destination,
            company: dto.company,
            route_code: dto.route,
            hour_code: dto.hour,
            additional_fare: dto.additional_fare,
            departure: dto.departure,
            arrival: dto.arrival,
            fare: dto.fare,
            available_seats: dto.available_seats,
            occupied_seats: dto.occupied_seats,
        }
    }
}

impl From<ServiceDto> for Trip {
    fn from(dto: ServiceDto) -> Self {
        Trip::new(dto.legs.into_iter().map(Leg::from).collect())
    }
}

/// Leg identification carried by seat and ticket requests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegRef<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub company: &'a str,
    pub route: &'a str,
    pub hour: &'a str,
    pub additional_fare: bool,
    pub departure: &'a str,
}

impl<'a> From<&'a LegRequest> for LegRef<'a> {
    fn from(leg: &'a LegRequest) -> Self {
        Self {
            origin: &leg.origin,
            destination: &leg.destination,
            company: &leg.company,
            route: &leg.route_code,
            hour: &leg.hour_code,
            additional_fare: leg.additional_fare,
            departure: &leg.departure,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeatMapResponse {
    #[serde(default)]
    pub seats: Vec<SeatDto>,
}

#[derive(Debug, Deserialize)]
pub struct SeatDto {
    pub number: u32,
    pub location: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub discount: u32,
    #[serde(default)]
    pub floor: u32,
}

impl From<SeatDto> for SeatMapEntry {
    fn from(dto: SeatDto) -> Self {
        Self {
            number: dto.number,
            location: dto.location,
            status: dto.status,
            discount_percent: dto.discount,
            floor: dto.floor,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeatRequest<'a> {
    #[serde(flatten)]
    pub leg: LegRef<'a>,
    pub seat: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketBody<'a> {
    pub reference_id: &'a str,
    #[serde(flatten)]
    pub leg: LegRef<'a>,
    pub seat: u32,
    pub first_name: &'a str,
    pub second_name: &'a str,
    pub last_name: &'a str,
    pub second_last_name: &'a str,
    pub document_type: &'a str,
    pub document_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<&'a str>,
    pub fare: i64,
    pub discount: i64,
}

impl<'a> From<&'a TicketRequest> for TicketBody<'a> {
    fn from(request: &'a TicketRequest) -> Self {
        Self {
            reference_id: &request.reference_id,
            leg: LegRef::from(&request.leg),
            seat: request.seat,
            first_name: &request.name.first,
            second_name: &request.name.second,
            last_name: &request.name.last,
            second_last_name: &request.name.second_last,
            document_type: &request.document_type,
            document_number: &request.document_number,
            nationality: request.nationality.as_deref(),
            fare: request.fare,
            discount: request.discount,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineConfirmBody<'a> {
    pub reference_id: &'a str,
    pub transaction_id: &'a str,
}

impl<'a> From<&'a OfflineConfirmation> for OfflineConfirmBody<'a> {
    fn from(confirmation: &'a OfflineConfirmation) -> Self {
        Self {
            reference_id: &confirmation.reference_id,
            transaction_id: &confirmation.transaction_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    #[serde(default)]
    pub ticket_number: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<TicketResponse> for TicketOutcome {
    fn from(response: TicketResponse) -> Self {
        Self {
            ticket_number: response.ticket_number,
            transaction_id: response.transaction_id,
            error: response.error,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CitiesResponse {
    #[serde(default)]
    pub cities: Vec<CityDto>,
}

#[derive(Debug, Deserialize)]
pub struct CityDto {
    pub code: String,
    pub name: String,
}

impl From<CityDto> for City {
    fn from(dto: CityDto) -> Self {
        Self {
            code: dto.code,
            name: dto.name,
        }
    }
}
