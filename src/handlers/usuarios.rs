//! CRUD, estadísticas y exportación de usuarios.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::postgres::PgPool;

use crate::date_format;
use crate::error::AppError;
use crate::export::{self, ReporteConfig};
use crate::filter::{filtrar, Busqueda};
use crate::model::{RegistroId, UsuarioModel, UsuarioPayload};
use crate::stats::resumir;
use crate::AppState;

const SELECT_USUARIO: &str = "SELECT usu_usuario_id AS id, \
     usu_veh_vehiculo_id AS vehiculo_id, \
     usu_nombre AS nombre, \
     usu_correo AS correo, \
     usu_rol AS rol, \
     usu_estado AS estado, \
     usu_fecha_registro AS fecha_registro \
     FROM flo_usuario";

async fn listar(db: &PgPool) -> Result<Vec<UsuarioModel>, AppError> {
    let sql = format!("{SELECT_USUARIO} ORDER BY usu_usuario_id");
    let usuarios = sqlx::query_as::<_, UsuarioModel>(&sql).fetch_all(db).await?;
    Ok(usuarios)
}

#[derive(Debug)]
struct CamposValidados {
    vehiculo_id: i32,
    nombre: String,
    rol: String,
    estado: String,
    fecha: String,
}

fn validar(payload: &UsuarioPayload) -> Result<CamposValidados, AppError> {
    let vehiculo_id = payload
        .vehiculo_id
        .ok_or_else(|| AppError::validation("Seleccione un vehículo"))?;
    let nombre = payload
        .nombre
        .clone()
        .filter(|nombre| !nombre.is_empty())
        .ok_or_else(|| AppError::validation("Ingrese el nombre del usuario"))?;
    let fecha = payload
        .fecha_registro
        .as_deref()
        .and_then(date_format::a_formato_almacen)
        .ok_or_else(|| AppError::validation("Ingrese la fecha de registro"))?;
    let rol = payload
        .rol
        .clone()
        .filter(|rol| !rol.is_empty())
        .unwrap_or_else(|| "Operador".to_string());
    let estado = payload
        .estado
        .clone()
        .filter(|estado| !estado.is_empty())
        .unwrap_or_else(|| "Activo".to_string());
    Ok(CamposValidados {
        vehiculo_id,
        nombre,
        rol,
        estado,
        fecha,
    })
}

#[get("/usuarios")]
pub async fn get_usuarios(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let usuarios = listar(&data.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "rows": usuarios.len(),
        "usuarios": usuarios
    })))
}

#[get("/usuarios/estadisticas")]
pub async fn get_estadisticas_usuarios(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let usuarios = listar(&data.db).await?;
    let filtrados = filtrar(&usuarios, query.consulta());
    Ok(HttpResponse::Ok().json(resumir(&filtrados)))
}

#[get("/usuarios/reporte")]
pub async fn get_reporte_usuarios(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let usuarios = listar(&data.db).await?;
    let consulta = query.consulta();
    let filtrados = filtrar(&usuarios, consulta);
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
            "attachment; filename=\"reporte_usuarios.txt\"",
        ))
        .body(reporte.contenido))
}

#[get("/usuarios/exportar")]
pub async fn get_exportar_usuarios(
    data: web::Data<AppState>,
    query: web::Query<Busqueda>,
) -> Result<HttpResponse, AppError> {
    let usuarios = listar(&data.db).await?;
    let filtrados = filtrar(&usuarios, query.consulta());
    let resumen = resumir(&filtrados);
    let libro = export::exportar_csv(&filtrados, &resumen)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"reporte_usuarios.csv\"",
        ))
        .body(libro))
}

#[get("/usuarios/{id}")]
pub async fn get_usuario_by_id(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let usuario_id = path.into_inner().0;
    let sql = format!("{SELECT_USUARIO} WHERE usu_usuario_id = $1");
    let resultado = sqlx::query_as::<_, UsuarioModel>(&sql)
        .bind(usuario_id)
        .fetch_optional(&data.db)
        .await?;

    match resultado {
        Some(mut usuario) => {
            if let Some(iso) = date_format::a_formato_iso(&usuario.fecha_registro) {
                usuario.fecha_registro = iso;
            }
            Ok(HttpResponse::Ok().json(usuario))
        }
        None => Err(AppError::not_found("Usuario no encontrado")),
    }
}

#[post("/usuarios")]
pub async fn post_usuario(
    data: web::Data<AppState>,
    request: web::Json<UsuarioPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let registro = sqlx::query_as::<_, RegistroId>(
        "INSERT INTO flo_usuario \
         (usu_veh_vehiculo_id, usu_nombre, usu_correo, usu_rol, usu_estado, usu_fecha_registro) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING usu_usuario_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.nombre)
    .bind(&payload.correo)
    .bind(&campos.rol)
    .bind(&campos.estado)
    .bind(&campos.fecha)
    .fetch_one(&data.db)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "id": registro.id,
        "message": "Usuario agregado correctamente"
    })))
}

#[put("/usuarios/{id}")]
pub async fn put_usuario(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
    request: web::Json<UsuarioPayload>,
) -> Result<HttpResponse, AppError> {
    let usuario_id = path.into_inner().0;
    let payload = request.into_inner();
    let campos = validar(&payload)?;

    let resultado = sqlx::query_as::<_, RegistroId>(
        "UPDATE flo_usuario SET \
         usu_veh_vehiculo_id = $1, usu_nombre = $2, usu_correo = $3, usu_rol = $4, \
         usu_estado = $5, usu_fecha_registro = $6 \
         WHERE usu_usuario_id = $7 \
         RETURNING usu_usuario_id AS id",
    )
    .bind(campos.vehiculo_id)
    .bind(&campos.nombre)
    .bind(&payload.correo)
    .bind(&campos.rol)
    .bind(&campos.estado)
    .bind(&campos.fecha)
    .bind(usuario_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Usuario actualizado correctamente"
        }))),
        None => Err(AppError::not_found("Usuario no encontrado")),
    }
}

#[delete("/usuarios/{id}")]
pub async fn delete_usuario(
    data: web::Data<AppState>,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, AppError> {
    let usuario_id = path.into_inner().0;
    let resultado = sqlx::query_as::<_, RegistroId>(
        "DELETE FROM flo_usuario WHERE usu_usuario_id = $1 RETURNING usu_usuario_id AS id",
    )
    .bind(usuario_id)
    .fetch_optional(&data.db)
    .await?;

    match resultado {
        Some(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Usuario eliminado correctamente"
        }))),
        None => Err(AppError::not_found("Usuario no encontrado")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_base() -> UsuarioPayload {
        UsuarioPayload {
            vehiculo_id: Some(4),
            nombre: Some("Ana López".to_string()),
            correo: None,
            rol: None,
            estado: None,
            fecha_registro: Some("2024-02-10".to_string()),
        }
    }

    #[test]
    fn sin_nombre_se_rechaza() {
        let payload = UsuarioPayload {
            nombre: None,
            ..payload_base()
        };
        let error = validar(&payload).unwrap_err();
        assert_eq!(error.to_string(), "Ingrese el nombre del usuario");
    }

    #[test]
    fn rol_y_estado_toman_sus_valores_por_defecto() {
        let campos = validar(&payload_base()).unwrap();
        assert_eq!(campos.rol, "Operador");
        assert_eq!(campos.estado, "Activo");
        assert_eq!(campos.fecha, "10-FEB-2024");
    }
}
