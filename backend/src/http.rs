use anyhow::Result;
use reqwest::{Client, RequestBuilder};

use crate::{
    agencies, routes, stops, trips, vehicles, Agency, Gateway, Route, RouteID, StationView, Stop,
    Trip, TripID, Vehicle,
};

/// Talks to the backend over HTTP. Responses are JSON, except for the status endpoints, which
/// return plain text.
pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, action: &str) -> Result<String> {
        send(self.client.get(self.url(path)), action).await
    }
}

// Adds the action to any error message
async fn send(request: RequestBuilder, action: &str) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|err| anyhow!("Failed to {action}: {err}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!(
            "Failed to {action}: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        );
    }
    response
        .text()
        .await
        .map_err(|err| anyhow!("Failed to {action}: {err}"))
}

impl Gateway for HttpGateway {
    async fn agencies(&self) -> Result<Vec<Agency>> {
        agencies::parse(&self.get("/api/agencies", "load agencies").await?)
    }

    async fn routes(&self) -> Result<Vec<Route>> {
        routes::parse(&self.get("/api/routes", "load routes").await?)
    }

    async fn routes_with_vehicles(&self) -> Result<Vec<Route>> {
        routes::parse(&self.get("/api/routes-with-vehicles", "load routes").await?)
    }

    async fn trips_for_route(&self, route: RouteID) -> Result<Vec<Trip>> {
        let request = self
            .client
            .get(self.url("/api/trips"))
            .query(&[("routeId", route.to_string())]);
        trips::parse(&send(request, "load trips").await?)
    }

    async fn select_active_trip(&self, trip: &TripID) -> Result<()> {
        let request = self
            .client
            .post(self.url("/api/trips/select"))
            .query(&[("tripId", trip.as_str())]);
        let ack = send(request, "select trip").await?;
        debug!("Backend says: {ack}");
        Ok(())
    }

    async fn selected_trip(&self) -> Result<String> {
        self.get("/api/trips/selected", "load selected trip").await
    }

    async fn stops(&self) -> Result<Vec<Stop>> {
        stops::parse(&self.get("/api/map", "load stations").await?)
    }

    async fn vehicles(&self) -> Result<Vec<Vehicle>> {
        vehicles::parse(&self.get("/api/vehicles", "load vehicles").await?)
    }

    async fn stations_with_vehicles(&self) -> Result<Vec<StationView>> {
        stops::parse_stations(
            &self
                .get("/api/stations-with-vehicles", "load stations")
                .await?,
        )
    }

    async fn set_rider_location(&self, lat: f64, lon: f64, name: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url("/api/user-location"))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("name", name.to_string()),
            ]);
        let ack = send(request, "set location").await?;
        debug!("Backend says: {ack}");
        Ok(())
    }

    async fn status_message(&self) -> Result<String> {
        self.get("/api/status", "load status").await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Answers exactly one request with a canned response. The handle resolves to the request
    /// line that was received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&head)
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let gateway = HttpGateway::new("https://example.org//");
        assert_eq!(gateway.url("/api/map"), "https://example.org/api/map");
    }

    #[tokio::test]
    async fn error_status_names_the_action() {
        let (url, server) = serve_once("503 Service Unavailable", "").await;
        let err = HttpGateway::new(url).vehicles().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to load vehicles: Service Unavailable");
        assert_eq!(server.await.unwrap(), "GET /api/vehicles HTTP/1.1");
    }

    #[tokio::test]
    async fn unreachable_backend() {
        // Bind and drop to find a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpGateway::new(format!("http://{addr}"))
            .agencies()
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to load agencies: "));
    }

    #[tokio::test]
    async fn trips_are_queried_by_route() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"trip_id": "12_0", "trip_headsign": "Gara", "route_id": 7, "direction_id": 0}]"#,
        )
        .await;
        let trips = HttpGateway::new(url)
            .trips_for_route(RouteID(7))
            .await
            .unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].headsign.as_deref(), Some("Gara"));
        assert_eq!(server.await.unwrap(), "GET /api/trips?routeId=7 HTTP/1.1");
    }

    #[tokio::test]
    async fn selecting_a_trip_posts() {
        let (url, server) = serve_once("200 OK", "Trip selected").await;
        HttpGateway::new(url)
            .select_active_trip(&TripID::new("12_0"))
            .await
            .unwrap();
        assert_eq!(
            server.await.unwrap(),
            "POST /api/trips/select?tripId=12_0 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn rider_location_is_encoded() {
        let (url, server) = serve_once("200 OK", "ok").await;
        HttpGateway::new(url)
            .set_rider_location(46.77, 23.6, "Piata & Unirii")
            .await
            .unwrap();
        assert_eq!(
            server.await.unwrap(),
            "POST /api/user-location?lat=46.77&lon=23.6&name=Piata+%26+Unirii HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn status_is_plain_text() {
        let (url, server) = serve_once("200 OK", "2 stops away").await;
        let status = HttpGateway::new(url).status_message().await.unwrap();
        assert_eq!(status, "2 stops away");
        assert_eq!(server.await.unwrap(), "GET /api/status HTTP/1.1");
    }
}
