mod date_format;
mod error;
mod export;
mod filter;
mod handlers;
mod model;
mod stats;

use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, web, App, HttpServer, Responder};
use dotenv::dotenv;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::handlers::{conductores, inspecciones, mantenimientos, usuarios, vehiculos};

#[get("/")]
async fn index() -> impl Responder {
    "Servidor backend funcionando"
}

pub struct AppState {
    pub db: PgPool,
    /// Logotipo opcional para el encabezado de los reportes.
    pub logo: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let port = std::env::var("HTTP_PORT")
        .expect("HTTP_PORT must be set")
        .parse::<u16>()
        .expect("HTTP_PORT must be a valid number");
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let logo = std::env::var("RUTA_LOGO").ok().map(PathBuf::from);

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Conexión a la base de datos establecida");
            pool
        }
        Err(err) => {
            println!("🔥 No se pudo conectar a la base de datos: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!().run(&pool).await {
        println!("🔥 No se pudieron aplicar las migraciones: {:?}", err);
        std::process::exit(1);
    }

    println!("🚀 Servidor backend escuchando en el puerto {}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                db: pool.clone(),
                logo: logo.clone(),
            }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allow_any_method()
                    .supports_credentials(),
            )
            .wrap(Logger::default())
            .service(index)
            // Vehículos
            .service(vehiculos::get_vehiculos)
            .service(vehiculos::get_vehiculo_by_id)
            .service(vehiculos::post_vehiculo)
            .service(vehiculos::put_vehiculo)
            .service(vehiculos::delete_vehiculo)
            // Usuarios: las rutas literales van antes que /{id}
            .service(usuarios::get_usuarios)
            .service(usuarios::get_estadisticas_usuarios)
            .service(usuarios::get_reporte_usuarios)
            .service(usuarios::get_exportar_usuarios)
            .service(usuarios::get_usuario_by_id)
            .service(usuarios::post_usuario)
            .service(usuarios::put_usuario)
            .service(usuarios::delete_usuario)
            // Conductores
            .service(conductores::get_conductores)
            .service(conductores::get_estadisticas_conductores)
            .service(conductores::get_reporte_conductores)
            .service(conductores::get_exportar_conductores)
            .service(conductores::get_conductor_by_id)
            .service(conductores::post_conductor)
            .service(conductores::put_conductor)
            .service(conductores::delete_conductor)
            // Mantenimientos
            .service(mantenimientos::get_mantenimientos)
            .service(mantenimientos::get_estadisticas_mantenimientos)
            .service(mantenimientos::get_reporte_mantenimientos)
            .service(mantenimientos::get_exportar_mantenimientos)
            .service(mantenimientos::get_mantenimiento_by_id)
            .service(mantenimientos::post_mantenimiento)
            .service(mantenimientos::put_mantenimiento)
            .service(mantenimientos::delete_mantenimiento)
            // Inspecciones técnicas
            .service(inspecciones::get_inspecciones)
            .service(inspecciones::get_estadisticas_inspecciones)
            .service(inspecciones::get_reporte_inspecciones)
            .service(inspecciones::get_exportar_inspecciones)
            .service(inspecciones::get_inspeccion_by_id)
            .service(inspecciones::post_inspeccion)
            .service(inspecciones::put_inspeccion)
            .service(inspecciones::delete_inspeccion)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
