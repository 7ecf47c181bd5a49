use crate::state::AppState;
use crate::websocket::{ChatConnection, WsInboundEvent, WsOutboundEvent};
use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_middleware::AuthContext;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

// WebSocket Actor
struct WsSession {
    connection: ChatConnection,
    outbound: Option<UnboundedReceiver<WsOutboundEvent>>,
    hb: Instant,
}

impl WsSession {
    fn new(connection: ChatConnection, outbound: Option<UnboundedReceiver<WsOutboundEvent>>) -> Self {
        Self {
            connection,
            outbound,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!("WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);

        // Anonymous sessions have no outbound stream and never relay anything
        if let Some(rx) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(rx));
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let mut connection = self.connection.clone();
        actix::spawn(async move {
            connection.disconnect().await;
        });
    }
}

// Relay events addressed to this connection
impl StreamHandler<WsOutboundEvent> for WsSession {
    fn handle(&mut self, event: WsOutboundEvent, ctx: &mut Self::Context) {
        match serde_json::to_string(&event) {
            Ok(text) => ctx.text(text),
            Err(e) => tracing::error!("Failed to serialize outbound event: {:?}", e),
        }
    }

    // The relay dropping our sender must not close the socket
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}

// Handle WebSocket protocol messages
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<WsInboundEvent>(&text) {
                Ok(evt) => {
                    let connection = self.connection.clone();
                    actix::spawn(async move {
                        connection.receive(evt).await;
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to parse WS message: {:?}", e);
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("Binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!("WebSocket close message received: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                tracing::warn!("WebSocket protocol error: {:?}", e);
                ctx.stop();
            }
            _ => {}
        }
    }
}

// HTTP handler
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, Error> {
    let (connection, outbound) = state.relay.connect(&auth).await;
    let mut registered = connection.clone();

    match ws::start(WsSession::new(connection, outbound), &req, stream) {
        Ok(resp) => Ok(resp),
        Err(e) => {
            // The actor never started, so `stopped` will not unregister it
            registered.disconnect().await;
            Err(e)
        }
    }
}
