//! CRUD, estadísticas y exportación de inspecciones técnicas.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::postgres::PgPool;

use crate::date_format;
use crate::error::AppError;
use crate::export::{self, ReporteConfig};
use crate::filter::{filtrar, Busqueda};
use crate::model::{InspeccionModel, InspeccionPayload, RegistroId};
use crate::stats::resumir;
use crate::AppState;

const SELECT_INSPECCION: &str = "SELECT ins_inspeccion_id AS id, \
     ins_veh_vehiculo_id AS vehiculo_id, \
     ins_fecha_inspeccion AS fecha_inspeccion, \
     ins_tipo_inspeccion AS tipo_inspeccion, \
     ins_estado AS estado \
     FROM flo_inspeccion_tecnica";

async fn listar(db: &PgPool) -> Result<Vec<InspeccionModel>, AppError> {
    let sql = format!("{SELECT_INSPECCION} ORDER BY ins_inspeccion_id");
    let inspecciones = sqlx::query_as::<_, InspeccionModel>(&sql)
        .fetch_all(db)
        .await?;
    Ok(inspecciones)
}

#[derive(Debug)]
struct CamposValidados {
    vehiculo_id: i32,
    fecha: String,
    tipo: String,
    estado: String,
}

// El formulario original exige vehículo y fecha en un solo mensaje.
fn validar(payload: &InspeccionPayload) -> Result<CamposValidados, AppError> {
    let fecha_iso = payload.fecha_inspeccion.as_deref().unwrap_or("");
    let (vehiculo_id, fecha) =
        match (payload.vehiculo_id, date_format::a_formato_almacen(fecha_iso)) {
            (Some(vehiculo_id), Some(fecha)) => (vehiculo_id, fecha),
            _ => {
                return Err(AppError::validation(
                    "El ID del vehículo y la fecha son requeridos",
                ))
            }
        };
    let tipo = payload
        .tipo_inspeccion
        .clone()
        .filter(|tipo| !tipo.is_empty())
        .unwrap_or_else(|| "Periódica".to_string());
    let estado = payload
        .estado
        .clone()
        .filter(|estado| !estado.is_empty())
        .unwrap_or_else(|| "Pendiente".to_string());
    Ok(CamposValidados {
        vehiculo_id,
        fecha,
        tipo,
        estado,
    })
}

#[get("/inspecciones-tecnicas")]
pub async fn get_inspecciones(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let inspecciones = listar(&data.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "rows": inspecciones.len(),
        "inspecciones": inspecciones
    })))
}

#[get("/inspecciones-tecnicas/estadisticas")]
pub async fn get_estadisticas_inspecciones(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let inspecciones = listar(&data.db).await?;
    let filtradas = filtrar(&inspecciones, query.consulta());
    Ok(HttpResponse::Ok().json(resumir(&filtradas)))
}

#[get("/inspecciones-tecnicas/reporte")]
pub async fn get_reporte_inspecciones(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let inspecciones = listar(&data.db).await?;
    let consulta = query.consulta();
    let filtradas = filtrar(&inspecciones, consulta);
    let resumen = resumir(&filtradas);
    let config = ReporteConfig {
        filtro: (!consulta.is_empty()).then(|| consulta.to_string()),
        logo: data.logo.clone(),
        ..ReporteConfig::default()
    };
    let reporte = export::generar_reporte(&filtradas, &resumen, &config);
    for advertencia in &reporte.advertencias {
        log::warn!("{advertencia}");
    }
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"reporte_inspecciones.txt\"",
        ))
        .body(reporte.contenido))
}

#[get("/inspecciones-tecnicas/exportar")]
pub async fn get_exportar_inspecciones(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let inspecciones = listar(&data.db).await?;
    let filtradas = filtrar(&inspecciones, query.consulta());
    let resumen = resumir(&filtradas);
    let libro = export::exportar_csv(&filtradas, &resumen)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"reporte_inspecciones.csv\"",
        ))
        .body(libro))
}

#[get("/inspecciones-tecnicas/{id}")]
pub async fn get_inspeccion_by_id(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let inspeccion_id = path.into_inner().0;
    let sql = format!("{SELECT_INSPECCION} WHERE ins_inspeccion_id = $1");
    let resultado = sqlx::query_as::<_, InspeccionModel>(&sql)
        .bind(inspeccion_id)
        .fetch_optional(&data.db)
        .await?;

    match resultado {
        Some(mut inspeccion) => {
            if let Some(iso) = date_format::a_formato_iso(&inspeccion.fecha_inspeccion) {
                inspeccion.fecha_inspeccion = iso;
            }
            Ok(HttpResponse::Ok().json(inspeccion))
        }
        None => Err(AppError::not_found("Inspección técnica no encontrada")),
    }
}

#[post("/inspecciones-tecnicas")]
pub async fn post_inspeccion(
    data: web::Data<AppState>,
    request: web::Json<InspeccionPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let registro = sqlx::query_as::<_, RegistroId>(
        "INSERT INTO flo_inspeccion_tecnica \
         (ins_veh_vehiculo_id, ins_fecha_inspeccion, ins_tipo_inspeccion, ins_estado) \
         VALUES ($1, $2, $3, $4) \
         RETURNING ins_inspeccion_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.fecha)
    .bind(&campos.tipo)
    .bind(&campos.estado)
    .fetch_one(&data.db)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "id": registro.id,
        "message": "Inspección técnica agregada correctamente"
    })))
}

#[put("/inspecciones-tecnicas/{id}")]
pub async fn put_inspeccion(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
    request: web::Json<InspeccionPayload>,
) -> Result<HttpResponse, AppError> {
    let inspeccion_id = path.into_inner().0;
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let resultado = sqlx::query_as::<_, RegistroId>(
        "UPDATE flo_inspeccion_tecnica SET \
         ins_veh_vehiculo_id = $1, ins_fecha_inspeccion = $2, ins_tipo_inspeccion = $3, \
         ins_estado = $4 \
         WHERE ins_inspeccion_id = $5 \
         RETURNING ins_inspeccion_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.fecha)
    .bind(&campos.tipo)
    .bind(&campos.estado)
    .bind(inspeccion_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Inspección técnica actualizada correctamente"
        }))),
        None => Err(AppError::not_found("Inspección técnica no encontrada")),
    }
}

#[delete("/inspecciones-tecnicas/{id}")]
pub async fn delete_inspeccion(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let inspeccion_id = path.into_inner().0;
    let resultado = sqlx::query_as::<_, RegistroId>(
        "DELETE FROM flo_inspeccion_tecnica WHERE ins_inspeccion_id = $1 \
         RETURNING ins_inspeccion_id AS id",
    )
    .bind(inspeccion_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Inspección técnica eliminada correctamente"
        }))),
        None => Err(AppError::not_found("Inspección técnica no encontrada")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_vehiculo_ni_fecha_se_rechaza_con_el_mensaje_del_formulario() {
        let payload = InspeccionPayload {
            vehiculo_id: None,
            fecha_inspeccion: None,
            tipo_inspeccion: None,
            estado: None,
        };
        let error = validar(&payload).unwrap_err();
        assert_eq!(
            error.to_string(),
            "El ID del vehículo y la fecha son requeridos"
        );
    }

    #[test]
    fn tipo_y_estado_toman_sus_valores_por_defecto() {
        let payload = InspeccionPayload {
            vehiculo_id: Some(7),
            fecha_inspeccion: Some("2024-03-02".to_string()),
            tipo_inspeccion: None,
            estado: None,
        };
        let campos = validar(&payload).unwrap();
        assert_eq!(campos.fecha, "02-MAR-2024");
        assert_eq!(campos.tipo, "Periódica");
        assert_eq!(campos.estado, "Pendiente");
    }
}
