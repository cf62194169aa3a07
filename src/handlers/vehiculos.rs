//! CRUD de vehículos, la tabla que referencian los demás módulos.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::model::{RegistroId, VehiculoModel, VehiculoPayload};
use crate::AppState;

const SELECT_VEHICULO: &str = "SELECT veh_vehiculo_id AS id, \
     veh_placa AS placa, \
     veh_marca AS marca, \
     veh_modelo AS modelo, \
     veh_kilometraje_actual AS kilometraje_actual \
     FROM flo_vehiculo";

#[derive(Debug)]
struct CamposValidados {
    placa: String,
    marca: String,
    modelo: String,
    kilometraje_actual: i32,
}

fn validar(payload: &VehiculoPayload) -> Result<CamposValidados, AppError> {
    let placa = payload
        .placa
        .clone()
        .filter(|placa| !placa.is_empty())
        .ok_or_else(|| AppError::validation("Ingrese la placa del vehículo"))?;
    let marca = payload
        .marca
        .clone()
        .filter(|marca| !marca.is_empty())
        .ok_or_else(|| AppError::validation("Ingrese la marca del vehículo"))?;
    let modelo = payload
        .modelo
        .clone()
        .filter(|modelo| !modelo.is_empty())
        .ok_or_else(|| AppError::validation("Ingrese el modelo del vehículo"))?;
    Ok(CamposValidados {
        placa,
        marca,
        modelo,
        kilometraje_actual: payload.kilometraje_actual.unwrap_or(0),
    })
}

#[get("/vehiculos")]
pub async fn get_vehiculos(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let sql = format!("{SELECT_VEHICULO} ORDER BY veh_vehiculo_id");
    let vehiculos = sqlx::query_as::<_, VehiculoModel>(&sql)
        .fetch_all(&data.db)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "rows": vehiculos.len(),
        "vehiculos": vehiculos
    })))
}

#[get("/vehiculos/{id}")]
pub async fn get_vehiculo_by_id(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let vehiculo_id = path.into_inner().0;
    let sql = format!("{SELECT_VEHICULO} WHERE veh_vehiculo_id = $1");
    let resultado = sqlx::query_as::<_, VehiculoModel>(&sql)
        .bind(vehiculo_id)
        .fetch_optional(&data.db)
        .await?;

    match resultado {
        Some(vehiculo) => Ok(HttpResponse::Ok().json(vehiculo)),
        None => Err(AppError::not_found("Vehículo no encontrado")),
    }
}

#[post("/vehiculos")]
pub async fn post_vehiculo(
    data: web::Data<AppState>,
    request: web::Json<VehiculoPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let registro = sqlx::query_as::<_, RegistroId>(
        "INSERT INTO flo_vehiculo (veh_placa, veh_marca, veh_modelo, veh_kilometraje_actual) \
         VALUES ($1, $2, $3, $4) \
         RETURNING veh_vehiculo_id AS id",
    )
    .bind(&campos.placa)
    .bind(&campos.marca)
    .bind(&campos.modelo)
    .bind(campos.kilometraje_actual)
    .fetch_one(&data.db)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "id": registro.id,
        "message": "Vehículo agregado correctamente"
    })))
}

#[put("/vehiculos/{id}")]
pub async fn put_vehiculo(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
    request: web::Json<VehiculoPayload>,
) -> Result<HttpResponse, AppError> {
    let vehiculo_id = path.into_inner().0;
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let resultado = sqlx::query_as::<_, RegistroId>(
        "UPDATE flo_vehiculo SET \
         veh_placa = $1, veh_marca = $2, veh_modelo = $3, veh_kilometraje_actual = $4 \
         WHERE veh_vehiculo_id = $5 \
         RETURNING veh_vehiculo_id AS id",
    )
    .bind(&campos.placa)
    .bind(&campos.marca)
    .bind(&campos.modelo)
    .bind(campos.kilometraje_actual)
    .bind(vehiculo_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Vehículo actualizado correctamente"
        }))),
        None => Err(AppError::not_found("Vehículo no encontrado")),
    }
}

#[delete("/vehiculos/{id}")]
pub async fn delete_vehiculo(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let vehiculo_id = path.into_inner().0;
    let resultado = sqlx::query_as::<_, RegistroId>(
        "DELETE FROM flo_vehiculo WHERE veh_vehiculo_id = $1 RETURNING veh_vehiculo_id AS id",
    )
    .bind(vehiculo_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Vehículo eliminado correctamente"
        }))),
        None => Err(AppError::not_found("Vehículo no encontrado")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_placa_se_rechaza() {
        let payload = VehiculoPayload {
            placa: None,
            marca: Some("Toyota".to_string()),
            modelo: Some("Hilux".to_string()),
            kilometraje_actual: Some(12000),
        };
        let error = validar(&payload).unwrap_err();
        assert_eq!(error.to_string(), "Ingrese la placa del vehículo");
    }

    #[test]
    fn el_kilometraje_ausente_arranca_en_cero() {
        let payload = VehiculoPayload {
            placa: Some("P-123XYZ".to_string()),
            marca: Some("Toyota".to_string()),
            modelo: Some("Hilux".to_string()),
            kilometraje_actual: None,
        };
        let campos = validar(&payload).unwrap();
        assert_eq!(campos.kilometraje_actual, 0);
    }
}
