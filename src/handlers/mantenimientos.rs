//! CRUD, estadísticas y exportación de mantenimientos.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::postgres::PgPool;

use crate::date_format;
use crate::error::AppError;
use crate::export::{self, ReporteConfig};
use crate::filter::{filtrar, Busqueda};
use crate::model::{MantenimientoModel, MantenimientoPayload, RegistroId};
use crate::stats::resumir;
use crate::AppState;

const SELECT_MANTENIMIENTO: &str = "SELECT man_mantenimiento_id AS id, \
     man_veh_vehiculo_id AS vehiculo_id, \
     man_tipo_mantenimiento AS tipo_mantenimiento, \
     man_fecha_mantenimiento AS fecha_mantenimiento, \
     man_kilometraje_mantenimiento AS kilometraje_mantenimiento, \
     man_descripcion AS descripcion, \
     man_estado AS estado, \
     man_costo_total AS costo_total, \
     man_repuestos_usados AS repuestos_usados \
     FROM flo_mantenimiento";

async fn listar(db: &PgPool) -> Result<Vec<MantenimientoModel>, AppError> {
    let sql = format!("{SELECT_MANTENIMIENTO} ORDER BY man_mantenimiento_id");
    let mantenimientos = sqlx::query_as::<_, MantenimientoModel>(&sql)
        .fetch_all(db)
        .await?;
    Ok(mantenimientos)
}

#[derive(Debug)]
struct CamposValidados {
    vehiculo_id: i32,
    tipo: String,
    fecha: String,
    estado: String,
}

/// Rechaza el cuerpo antes de tocar la base de datos; los mensajes son los
/// del formulario de alta. La fecha llega en ISO y se convierte al formato
/// de almacenamiento.
fn validar(payload: &MantenimientoPayload) -> Result<CamposValidados, AppError> {
    let vehiculo_id = payload
        .vehiculo_id
        .ok_or_else(|| AppError::validation("Seleccione un vehículo"))?;
    let tipo = payload
        .tipo_mantenimiento
        .clone()
        .filter(|tipo| !tipo.is_empty())
        .ok_or_else(|| AppError::validation("Seleccione el tipo de mantenimiento"))?;
    let fecha = payload
        .fecha_mantenimiento
        .as_deref()
        .and_then(date_format::a_formato_almacen)
        .ok_or_else(|| AppError::validation("Ingrese la fecha del mantenimiento"))?;
    let estado = payload
        .estado
        .clone()
        .filter(|estado| !estado.is_empty())
        .unwrap_or_else(|| "Pendiente".to_string());
    Ok(CamposValidados {
        vehiculo_id,
        tipo,
        fecha,
        estado,
    })
}

#[get("/mantenimientos")]
pub async fn get_mantenimientos(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let mantenimientos = listar(&data.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "rows": mantenimientos.len(),
        "mantenimientos": mantenimientos
    })))
}

#[get("/mantenimientos/estadisticas")]
pub async fn get_estadisticas_mantenimientos(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let mantenimientos = listar(&data.db).await?;
    let filtrados = filtrar(&mantenimientos, query.consulta());
    Ok(HttpResponse::Ok().json(resumir(&filtrados)))
}

#[get("/mantenimientos/reporte")]
pub async fn get_reporte_mantenimientos(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let mantenimientos = listar(&data.db).await?;
    let consulta = query.consulta();
    let filtrados = filtrar(&mantenimientos, consulta);
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
            "attachment; filename=\"reporte_mantenimientos.txt\"",
        ))
        .body(reporte.contenido))
}

#[get("/mantenimientos/exportar")]
pub async fn get_exportar_mantenimientos(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let mantenimientos = listar(&data.db).await?;
    let filtrados = filtrar(&mantenimientos, query.consulta());
    let resumen = resumir(&filtrados);
    let libro = export::exportar_csv(&filtrados, &resumen)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"reporte_mantenimientos.csv\"",
        ))
        .body(libro))
}

#[get("/mantenimientos/{id}")]
pub async fn get_mantenimiento_by_id(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let mantenimiento_id = path.into_inner().0;
    let sql = format!("{SELECT_MANTENIMIENTO} WHERE man_mantenimiento_id = $1");
    let resultado = sqlx::query_as::<_, MantenimientoModel>(&sql)
        .bind(mantenimiento_id)
        .fetch_optional(&data.db)
        .await?;

    match resultado {
        Some(mut mantenimiento) => {
            // Hidratación del formulario de edición: la fecha vuelve en ISO.
            if let Some(iso) = date_format::a_formato_iso(&mantenimiento.fecha_mantenimiento) {
                mantenimiento.fecha_mantenimiento = iso;
            }
            Ok(HttpResponse::Ok().json(mantenimiento))
        }
        None => Err(AppError::not_found("Mantenimiento no encontrado")),
    }
}

#[post("/mantenimientos")]
pub async fn post_mantenimiento(
    data: web::Data<AppState>,
    request: web::Json<MantenimientoPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let registro = sqlx::query_as::<_, RegistroId>(
        "INSERT INTO flo_mantenimiento \
         (man_veh_vehiculo_id, man_tipo_mantenimiento, man_fecha_mantenimiento, \
          man_kilometraje_mantenimiento, man_descripcion, man_estado, man_costo_total, \
          man_repuestos_usados) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING man_mantenimiento_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.tipo)
    .bind(&campos.fecha)
    .bind(payload.kilometraje_mantenimiento)
    .bind(&payload.descripcion)
    .bind(&campos.estado)
    .bind(payload.costo_total)
    .bind(&payload.repuestos_usados)
    .fetch_one(&data.db)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "id": registro.id,
        "message": "Mantenimiento agregado correctamente"
    })))
}

#[put("/mantenimientos/{id}")]
pub async fn put_mantenimiento(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
    request: web::Json<MantenimientoPayload>,
) -> Result<HttpResponse, AppError> {
    let mantenimiento_id = path.into_inner().0;
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let resultado = sqlx::query_as::<_, RegistroId>(
        "UPDATE flo_mantenimiento SET \
         man_veh_vehiculo_id = $1, man_tipo_mantenimiento = $2, man_fecha_mantenimiento = $3, \
         man_kilometraje_mantenimiento = $4, man_descripcion = $5, man_estado = $6, \
         man_costo_total = $7, man_repuestos_usados = $8 \
         WHERE man_mantenimiento_id = $9 \
         RETURNING man_mantenimiento_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.tipo)
    .bind(&campos.fecha)
    .bind(payload.kilometraje_mantenimiento)
    .bind(&payload.descripcion)
    .bind(&campos.estado)
    .bind(payload.costo_total)
    .bind(&payload.repuestos_usados)
    .bind(mantenimiento_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Mantenimiento actualizado correctamente"
        }))),
        None => Err(AppError::not_found("Mantenimiento no encontrado")),
    }
}

#[delete("/mantenimientos/{id}")]
pub async fn delete_mantenimiento(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let mantenimiento_id = path.into_inner().0;
    let resultado = sqlx::query_as::<_, RegistroId>(
        "DELETE FROM flo_mantenimiento WHERE man_mantenimiento_id = $1 \
         RETURNING man_mantenimiento_id AS id",
    )
    .bind(mantenimiento_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Mantenimiento eliminado correctamente"
        }))),
        None => Err(AppError::not_found("Mantenimiento no encontrado")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn un_cuerpo_sin_vehiculo_se_rechaza_sin_tocar_la_base() {
        let payload = MantenimientoPayload {
            vehiculo_id: None,
            tipo_mantenimiento: Some("Preventivo".to_string()),
            fecha_mantenimiento: Some("2023-12-15".to_string()),
            kilometraje_mantenimiento: None,
            descripcion: None,
            estado: None,
            costo_total: None,
            repuestos_usados: None,
        };
        let error = validar(&payload).unwrap_err();
        assert_eq!(error.to_string(), "Seleccione un vehículo");
    }

    #[test]
    fn un_cuerpo_sin_fecha_se_rechaza() {
        let payload = MantenimientoPayload {
            vehiculo_id: Some(3),
            tipo_mantenimiento: Some("Preventivo".to_string()),
            fecha_mantenimiento: None,
            kilometraje_mantenimiento: None,
            descripcion: None,
            estado: None,
            costo_total: None,
            repuestos_usados: None,
        };
        let error = validar(&payload).unwrap_err();
        assert_eq!(error.to_string(), "Ingrese la fecha del mantenimiento");
    }

    #[test]
    fn la_fecha_se_convierte_y_el_estado_toma_su_valor_por_defecto() {
        let payload = MantenimientoPayload {
            vehiculo_id: Some(3),
            tipo_mantenimiento: Some("Correctivo".to_string()),
            fecha_mantenimiento: Some("2023-12-15".to_string()),
            kilometraje_mantenimiento: Some(45000),
            descripcion: None,
            estado: None,
            costo_total: None,
            repuestos_usados: None,
        };
        let campos = validar(&payload).unwrap();
        assert_eq!(campos.fecha, "15-DIC-2023");
        assert_eq!(campos.estado, "Pendiente");
    }
}
