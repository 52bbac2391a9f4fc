use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{data_route, default_route, scrape_route},
};

pub fn run(listener: TcpListener, settings: Settings) -> Result<Server, std::io::Error> {
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(scrape_route::scrape)
            .service(data_route::download)
            .service(data_route::latest_data)
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
