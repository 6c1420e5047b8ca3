mod error;
mod job_schedulers;
mod medication;
mod reminder;
mod shared;
mod status;

pub use reminder::scheduler::{ReminderScheduler, TimerId};

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::start_reconcile_sweep_job;
use pillbox_infra::PillboxContext;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    medication::configure_routes(cfg);
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: PillboxContext) -> Result<Self, std::io::Error> {
        let scheduler = ReminderScheduler::new(context.clone());
        let (server, port) =
            Application::configure_server(context.clone(), scheduler.clone()).await?;
        Application::start_job_schedulers(context, scheduler);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: PillboxContext, scheduler: Arc<ReminderScheduler>) {
        start_reconcile_sweep_job(context, scheduler);
    }

    async fn configure_server(
        context: PillboxContext,
        scheduler: Arc<ReminderScheduler>,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();
            let scheduler = scheduler.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .app_data(web::Data::from(scheduler))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
