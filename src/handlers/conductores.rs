//! CRUD, estadísticas y exportación de conductores.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::postgres::PgPool;

use crate::date_format;
use crate::error::AppError;
use crate::export::{self, ReporteConfig};
use crate::filter::{filtrar, Busqueda};
use crate::model::{ConductorModel, ConductorPayload, RegistroId};
use crate::stats::resumir;
use crate::AppState;

const SELECT_CONDUCTOR: &str = "SELECT con_conductor_id AS id, \
     con_veh_vehiculo_id AS vehiculo_id, \
     con_nombre AS nombre, \
     con_numero_licencia AS numero_licencia, \
     con_tipo_licencia AS tipo_licencia, \
     con_estado AS estado, \
     con_fecha_vencimiento_licencia AS fecha_vencimiento_licencia \
     FROM flo_conductor";

async fn listar(db: &PgPool) -> Result<Vec<ConductorModel>, AppError> {
    let sql = format!("{SELECT_CONDUCTOR} ORDER BY con_conductor_id");
    let conductores = sqlx::query_as::<_, ConductorModel>(&sql)
        .fetch_all(db)
        .await?;
    Ok(conductores)
}

#[derive(Debug)]
struct CamposValidados {
    vehiculo_id: i32,
    nombre: String,
    tipo_licencia: String,
    estado: String,
    fecha: String,
}

fn validar(payload: &ConductorPayload) -> Result<CamposValidados, AppError> {
    let vehiculo_id = payload
        .vehiculo_id
        .ok_or_else(|| AppError::validation("Seleccione un vehículo"))?;
    let nombre = payload
        .nombre
        .clone()
        .filter(|nombre| !nombre.is_empty())
        .ok_or_else(|| AppError::validation("Ingrese el nombre del conductor"))?;
    let fecha = payload
        .fecha_vencimiento_licencia
        .as_deref()
        .and_then(date_format::a_formato_almacen)
        .ok_or_else(|| {
            AppError::validation("Ingrese la fecha de vencimiento de la licencia")
        })?;
    let tipo_licencia = payload
        .tipo_licencia
        .clone()
        .filter(|tipo| !tipo.is_empty())
        .unwrap_or_else(|| "Liviana".to_string());
    let estado = payload
        .estado
        .clone()
        .filter(|estado| !estado.is_empty())
        .unwrap_or_else(|| "Disponible".to_string());
    Ok(CamposValidados {
        vehiculo_id,
        nombre,
        tipo_licencia,
        estado,
        fecha,
    })
}

#[get("/conductores")]
pub async fn get_conductores(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let conductores = listar(&data.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "rows": conductores.len(),
        "conductores": conductores
    })))
}

#[get("/conductores/estadisticas")]
pub async fn get_estadisticas_conductores(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let conductores = listar(&data.db).await?;
    let filtrados = filtrar(&conductores, query.consulta());
    Ok(HttpResponse::Ok().json(resumir(&filtrados)))
}

#[get("/conductores/reporte")]
pub async fn get_reporte_conductores(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let conductores = listar(&data.db).await?;
    let consulta = query.consulta();
    let filtrados = filtrar(&conductores, consulta);
    let resumen = resumir(&filtrados);
    let config = ReporteConfig {
        filtro: (!consulta.is_empty()).then(|| consulta.to_string()),
        logo: data.logo.clone(),
        ..ReporteConfig::default()
    };
    let reporte = export::generar_reporte(&filtrados, &resumen, &config);
    for advertencia in &reporte.advertencias {
        log::warn!("{advertencia}");
    }
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"reporte_conductores.txt\"",
        ))
        .body(reporte.contenido))
}

#[get("/conductores/exportar")]
pub async fn get_exportar_conductores(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let conductores = listar(&data.db).await?;
    let filtrados = filtrar(&conductores, query.consulta());
    let resumen = resumir(&filtrados);
    let libro = export::exportar_csv(&filtrados, &resumen)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"reporte_conductores.csv\"",
        ))
        .body(libro))
}

#[get("/conductores/{id}")]
pub async fn get_conductor_by_id(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let conductor_id = path.into_inner().0;
    let sql = format!("{SELECT_CONDUCTOR} WHERE con_conductor_id = $1");
    let resultado = sqlx::query_as::<_, ConductorModel>(&sql)
        .bind(conductor_id)
        .fetch_optional(&data.db)
        .await?;

    match resultado {
        Some(mut conductor) => {
            if let Some(iso) = date_format::a_formato_iso(&conductor.fecha_vencimiento_licencia) {
                conductor.fecha_vencimiento_licencia = iso;
            }
            Ok(HttpResponse::Ok().json(conductor))
        }
        None => Err(AppError::not_found("Conductor no encontrado")),
    }
}

#[post("/conductores")]
pub async fn post_conductor(
    data: web::Data<AppState>,
    request: web::Json<ConductorPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let registro = sqlx::query_as::<_, RegistroId>(
        "INSERT INTO flo_conductor \
         (con_veh_vehiculo_id, con_nombre, con_numero_licencia, con_tipo_licencia, con_estado, \
          con_fecha_vencimiento_licencia) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING con_conductor_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.nombre)
    .bind(&payload.numero_licencia)
    .bind(&campos.tipo_licencia)
    .bind(&campos.estado)
    .bind(&campos.fecha)
    .fetch_one(&data.db)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "id": registro.id,
        "message": "Conductor agregado correctamente"
    })))
}

#[put("/conductores/{id}")]
pub async fn put_conductor(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
    request: web::Json<ConductorPayload>,
) -> Result<HttpResponse, AppError> {
    let conductor_id = path.into_inner().0;
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let resultado = sqlx::query_as::<_, RegistroId>(
        "UPDATE flo_conductor SET \
         con_veh_vehiculo_id = $1, con_nombre = $2, con_numero_licencia = $3, \
         con_tipo_licencia = $4, con_estado = $5, con_fecha_vencimiento_licencia = $6 \
         WHERE con_conductor_id = $7 \
         RETURNING con_conductor_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.nombre)
    .bind(&payload.numero_licencia)
    .bind(&campos.tipo_licencia)
    .bind(&campos.estado)
    .bind(&campos.fecha)
    .bind(conductor_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Conductor actualizado correctamente"
        }))),
        None => Err(AppError::not_found("Conductor no encontrado")),
    }
}

#[delete("/conductores/{id}")]
pub async fn delete_conductor(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let conductor_id = path.into_inner().0;
    let resultado = sqlx::query_as::<_, RegistroId>(
        "DELETE FROM flo_conductor WHERE con_conductor_id = $1 \
         RETURNING con_conductor_id AS id",
    )
    .bind(conductor_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Conductor eliminado correctamente"
        }))),
        None => Err(AppError::not_found("Conductor no encontrado")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_vehiculo_se_rechaza() {
        let payload = ConductorPayload {
            vehiculo_id: None,
            nombre: Some("Carlos Pérez".to_string()),
            numero_licencia: None,
            tipo_licencia: None,
            estado: None,
            fecha_vencimiento_licencia: Some("2025-06-30".to_string()),
        };
        let error = validar(&payload).unwrap_err();
        assert_eq!(error.to_string(), "Seleccione un vehículo");
    }

    #[test]
    fn la_fecha_de_vencimiento_se_convierte_al_formato_de_almacen() {
        let payload = ConductorPayload {
            vehiculo_id: Some(2),
            nombre: Some("Carlos Pérez".to_string()),
            numero_licencia: Some("L-4501".to_string()),
            tipo_licencia: Some("Pesada".to_string()),
            estado: None,
            fecha_vencimiento_licencia: Some("2025-06-30".to_string()),
        };
        let campos = validar(&payload).unwrap();
        assert_eq!(campos.fecha, "30-JUN-2025");
        assert_eq!(campos.estado, "Disponible");
    }
}
