use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;
use tracing::{debug, warn};
use tramo_core::booking::{OfflineConfirmation, SeatMark, TicketOutcome, TicketRequest};
use tramo_core::params::LegRequest;
use tramo_core::seat::SeatMapEntry;
use tramo_core::trip::{City, Trip, TripQuery};
use tramo_core::vendor::{Credentials, VendorApi};
use tramo_core::CoreResult;

use crate::error::VendorError;
use crate::models::{
    CitiesResponse, ErrorEnvelope, LegRef, LoginRequest, LoginResponse, OfflineConfirmBody,
    SeatMapResponse, SeatRequest, TicketBody, TicketResponse, TripSearchRequest,
    TripSearchResponse,
};

/// Date layout the vendor expects in trip searches.
const SEARCH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Vendor API over HTTP/JSON with bearer-token authentication.
#[derive(Clone)]
pub struct HttpVendorClient {
    client: Client,
    base_url: String,
}

impl HttpVendorClient {
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, VendorError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send and decode, turning the vendor's failure envelope into an error.
    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T, VendorError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            if envelope.is_failure() {
                warn!("Vendor {} failed: {}", path, envelope.message);
                return Err(VendorError::Envelope(envelope.message));
            }
        }
        if !status.is_success() {
            return Err(VendorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Vendor {} answered {}", path, status);
        serde_json::from_str(&body).map_err(|e| VendorError::Decode(format!("{}: {}", path, e)))
    }

    async fn post<B, T>(&self, path: &str, token: Option<&str>, body: &B) -> Result<T, VendorError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.send(path, request).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        query: &[(&str, &str)],
    ) -> Result<T, VendorError> {
        let request = self.client.get(self.url(path)).bearer_auth(token).query(query);
        self.send(path, request).await
    }
}

#[async_trait]
impl VendorApi for HttpVendorClient {
    async fn authenticate(&self, credentials: &Credentials) -> CoreResult<String> {
        let body = LoginRequest {
            user: &credentials.user,
            password: credentials.password.expose(),
        };
        let response: LoginResponse = self.post("auth/login", None, &body).await?;
        Ok(response.token)
    }

    async fn list_trips(&self, token: &str, query: &TripQuery, company: &str) -> CoreResult<Vec<Trip>> {
        let body = TripSearchRequest {
            origin: &query.origin,
            destination: &query.destination,
            date: query.date.format(SEARCH_DATE_FORMAT).to_string(),
            company,
        };
        let response: TripSearchResponse = self.post("services/search", Some(token), &body).await?;
        Ok(response.services.into_iter().map(Trip::from).collect())
    }

    async fn get_seat_map(&self, token: &str, leg: &LegRequest) -> CoreResult<Vec<SeatMapEntry>> {
        let response: SeatMapResponse = self
            .post("seats/map", Some(token), &LegRef::from(leg))
            .await?;
        Ok(response.seats.into_iter().map(SeatMapEntry::from).collect())
    }

    async fn mark_seat(&self, token: &str, mark: &SeatMark) -> CoreResult<()> {
        let body = SeatRequest {
            leg: LegRef::from(&mark.leg),
            seat: mark.seat,
        };
        let _: IgnoredAny = self.post("seats/mark", Some(token), &body).await?;
        Ok(())
    }

    async fn unmark_seat(&self, token: &str, mark: &SeatMark) -> CoreResult<()> {
        let body = SeatRequest {
            leg: LegRef::from(&mark.leg),
            seat: mark.seat,
        };
        let _: IgnoredAny = self.post("seats/unmark", Some(token), &body).await?;
        Ok(())
    }

    async fn create_ticket(&self, token: &str, request: &TicketRequest) -> CoreResult<TicketOutcome> {
        let response: TicketResponse = self
            .post("tickets", Some(token), &TicketBody::from(request))
            .await?;
        Ok(response.into())
    }

    async fn confirm_offline_ticket(
        &self,
        token: &str,
        confirmation: &OfflineConfirmation,
    ) -> CoreResult<TicketOutcome> {
        let response: TicketResponse = self
            .post("tickets/confirm", Some(token), &OfflineConfirmBody::from(confirmation))
            .await?;
        Ok(response.into())
    }

    async fn list_origins(&self, token: &str) -> CoreResult<Vec<City>> {
        let response: CitiesResponse = self.get("cities/origins", token, &[]).await?;
        Ok(response.cities.into_iter().map(City::from).collect())
    }

    async fn list_destinations(&self, token: &str, origin: &str) -> CoreResult<Vec<City>> {
        let response: CitiesResponse = self
            .get("cities/destinations", token, &[("origin", origin)])
            .await?;
        Ok(response.cities.into_iter().map(City::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use tramo_core::booking::PassengerName;
    use tramo_core::CoreError;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpVendorClient {
        HttpVendorClient::new(&server.uri(), Duration::from_secs(1), Duration::from_secs(5)).unwrap()
    }

    fn leg_request() -> LegRequest {
        LegRequest {
            origin: "STG".to_string(),
            destination: "TAL".to_string(),
            company: "TUR".to_string(),
            route_code: "R1".to_string(),
            hour_code: "0730".to_string(),
            additional_fare: false,
            departure: "24/12/2025 07:30".to_string(),
            fare: 7_000,
        }
    }

    #[tokio::test]
    async fn test_authenticate_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_partial_json(json!({"user": "tramo", "password": "s3cret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
            .mount(&server)
            .await;

        let token = client(&server)
            .authenticate(&Credentials::new("tramo", "s3cret"))
            .await
            .unwrap();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_list_trips_maps_services() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/search"))
            .and(header("authorization", "Bearer abc"))
            .and(body_partial_json(json!({"date": "24/12/2025", "company": "TUR"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "services": [{
                    "legs": [{
                        "origin": "STG",
                        "destination": "TAL",
                        "company": "TUR",
                        "route": "R1",
                        "hour": "0730",
                        "additionalFare": true,
                        "departure": "24/12/2025 07:30",
                        "arrival": "24/12/2025 10:00",
                        "fare": 7000,
                        "availableSeats": 30,
                        "occupiedSeats": 14
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let query = TripQuery {
            origin: "STG".to_string(),
            destination: "TAL".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
        };
        let trips = client(&server).list_trips("abc", &query, "TUR").await.unwrap();

        assert_eq!(trips.len(), 1);
        let leg = &trips[0].legs[0];
        assert_eq!(leg.route_code, "R1");
        assert!(leg.additional_fare);
        assert_eq!((leg.available_seats, leg.occupied_seats), (30, 14));
    }

    #[tokio::test]
    async fn test_envelope_becomes_vendor_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": true,
                "message": "No existen servicios para la fecha"
            })))
            .mount(&server)
            .await;

        let query = TripQuery {
            origin: "STG".to_string(),
            destination: "TAL".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
        };
        let result = client(&server).list_trips("abc", &query, "TUR").await;

        assert!(matches!(result, Err(CoreError::VendorRequest(m)) if m == "No existen servicios para la fecha"));
    }

    #[tokio::test]
    async fn test_http_failure_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/seats/mark"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let mark = SeatMark {
            leg: leg_request(),
            seat: 3,
        };
        let result = client(&server).mark_seat("abc", &mark).await;

        assert!(matches!(result, Err(CoreError::VendorRequest(m)) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_seat_map_and_mark() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/seats/map"))
            .and(body_partial_json(json!({"route": "R1", "hour": "0730"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "seats": [
                    {"number": 1, "location": "IV1", "status": "L", "discount": 10},
                    {"number": 0, "location": "PA1"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/seats/mark"))
            .and(body_partial_json(json!({"route": "R1", "seat": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false, "message": "OK"})))
            .expect(1)
            .mount(&server)
            .await;

        let vendor = client(&server);
        let entries = vendor.get_seat_map("abc", &leg_request()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].discount_percent, 10);
        assert!(entries[1].status.is_empty());

        let mark = SeatMark {
            leg: leg_request(),
            seat: 1,
        };
        vendor.mark_seat("abc", &mark).await.unwrap();
    }

    #[tokio::test]
    async fn test_ticket_level_error_is_an_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tickets"))
            .and(body_partial_json(json!({"referenceId": "1a2b3c4dAB12", "firstName": "Maria"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "asiento vendido"})))
            .mount(&server)
            .await;

        let request = TicketRequest {
            reference_id: "1a2b3c4dAB12".to_string(),
            leg: leg_request(),
            seat: 3,
            name: PassengerName {
                first: "Maria".to_string(),
                second: String::new(),
                last: "Rodriguez".to_string(),
                second_last: String::new(),
            },
            document_type: "RUT".to_string(),
            document_number: "1-9".to_string(),
            nationality: Some("CL".to_string()),
            fare: 7_000,
            discount: 0,
        };
        let outcome = client(&server).create_ticket("abc", &request).await.unwrap();

        assert_eq!(outcome.error_message(), Some("asiento vendido"));
    }

    #[tokio::test]
    async fn test_offline_confirmation_and_cities() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tickets/confirm"))
            .and(body_partial_json(json!({"referenceId": "REF1", "transactionId": "TX-9"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ticketNumber": "TK-9",
                "transactionId": "TX-9"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cities/destinations"))
            .and(query_param("origin", "STG"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cities": [{"code": "TAL", "name": "Talca"}]
            })))
            .mount(&server)
            .await;

        let vendor = client(&server);
        let confirmation = OfflineConfirmation {
            reference_id: "REF1".to_string(),
            transaction_id: "TX-9".to_string(),
        };
        let outcome = vendor.confirm_offline_ticket("abc", &confirmation).await.unwrap();
        assert_eq!(outcome.ticket_number.as_deref(), Some("TK-9"));

        let cities = vendor.list_destinations("abc", "STG").await.unwrap();
        assert_eq!(cities[0].name, "Talca");
    }
}
