//! Modelos de las tablas de la flota y cuerpos de las peticiones.
//!
//! Cada modelo mapea una tabla con columnas prefijadas por módulo; las
//! consultas las renombran a los campos de estos structs. Los cuerpos de
//! crear/actualizar llegan en camelCase, como los envía el formulario.

use serde::{Deserialize, Serialize};

/// Fila devuelta por las sentencias `RETURNING ... AS id`.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct RegistroId {
    pub id: i32,
}

/// Forma común de los registros de los cuatro módulos: cada uno referencia un
/// vehículo y clasifica sus filas con un estado y un tipo tomados de una
/// enumeración fija, en el orden en que el formulario de alta los ofrece.
pub trait Registro {
    /// Estados del módulo, en el orden del formulario.
    const ESTADOS: &'static [&'static str];
    /// Tipos del módulo, en el orden del formulario.
    const TIPOS: &'static [&'static str];

    fn estado(&self) -> &str;
    fn tipo(&self) -> &str;
    fn vehiculo_id(&self) -> i32;
}

/// Proyección tabular de un registro para los reportes y la exportación.
pub trait Exportable: Registro {
    const TITULO_REPORTE: &'static str;
    const ETIQUETA_TOTAL: &'static str;
    const COLUMNAS: &'static [&'static str];

    fn fila(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Vehículos (tabla de referencia, solo CRUD)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct VehiculoModel {
    pub id: i32,
    pub placa: String,
    pub marca: String,
    pub modelo: String,
    pub kilometraje_actual: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiculoPayload {
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub kilometraje_actual: Option<i32>,
}

// ---------------------------------------------------------------------------
// Usuarios
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct UsuarioModel {
    pub id: i32,
    pub vehiculo_id: i32,
    pub nombre: String,
    pub correo: Option<String>,
    pub rol: String,
    pub estado: String,
    pub fecha_registro: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioPayload {
    pub vehiculo_id: Option<i32>,
    pub nombre: Option<String>,
    pub correo: Option<String>,
    pub rol: Option<String>,
    pub estado: Option<String>,
    pub fecha_registro: Option<String>,
}

impl Registro for UsuarioModel {
    const ESTADOS: &'static [&'static str] = &["Activo", "Inactivo", "Suspendido"];
    const TIPOS: &'static [&'static str] = &["Administrador", "Supervisor", "Operador"];

    fn estado(&self) -> &str {
        &self.estado
    }

    fn tipo(&self) -> &str {
        &self.rol
    }

    fn vehiculo_id(&self) -> i32 {
        self.vehiculo_id
    }
}

impl Exportable for UsuarioModel {
    const TITULO_REPORTE: &'static str = "Reporte de Usuarios";
    const ETIQUETA_TOTAL: &'static str = "Total usuarios";
    const COLUMNAS: &'static [&'static str] = &[
        "ID",
        "Vehículo ID",
        "Nombre",
        "Correo",
        "Fecha Registro",
        "Rol",
        "Estado",
    ];

    fn fila(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.vehiculo_id.to_string(),
            self.nombre.clone(),
            self.correo.clone().unwrap_or_else(|| "N/A".to_string()),
            self.fecha_registro.clone(),
            self.rol.clone(),
            self.estado.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Conductores
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConductorModel {
    pub id: i32,
    pub vehiculo_id: i32,
    pub nombre: String,
    pub numero_licencia: Option<String>,
    pub tipo_licencia: String,
    pub estado: String,
    pub fecha_vencimiento_licencia: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConductorPayload {
    pub vehiculo_id: Option<i32>,
    pub nombre: Option<String>,
    pub numero_licencia: Option<String>,
    pub tipo_licencia: Option<String>,
    pub estado: Option<String>,
    pub fecha_vencimiento_licencia: Option<String>,
}

impl Registro for ConductorModel {
    const ESTADOS: &'static [&'static str] = &["Disponible", "En Ruta", "Suspendido"];
    const TIPOS: &'static [&'static str] = &["Liviana", "Pesada", "Especial"];

    fn estado(&self) -> &str {
        &self.estado
    }

    fn tipo(&self) -> &str {
        &self.tipo_licencia
    }

    fn vehiculo_id(&self) -> i32 {
        self.vehiculo_id
    }
}

impl Exportable for ConductorModel {
    const TITULO_REPORTE: &'static str = "Reporte de Conductores";
    const ETIQUETA_TOTAL: &'static str = "Total conductores";
    const COLUMNAS: &'static [&'static str] = &[
        "ID",
        "Vehículo ID",
        "Nombre",
        "Licencia",
        "Tipo Licencia",
        "Vencimiento",
        "Estado",
    ];

    fn fila(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.vehiculo_id.to_string(),
            self.nombre.clone(),
            self.numero_licencia
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            self.tipo_licencia.clone(),
            self.fecha_vencimiento_licencia.clone(),
            self.estado.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Mantenimientos
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct MantenimientoModel {
    pub id: i32,
    pub vehiculo_id: i32,
    pub tipo_mantenimiento: String,
    pub fecha_mantenimiento: String,
    pub kilometraje_mantenimiento: Option<i32>,
    pub descripcion: Option<String>,
    pub estado: String,
    pub costo_total: Option<f64>,
    pub repuestos_usados: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MantenimientoPayload {
    pub vehiculo_id: Option<i32>,
    pub tipo_mantenimiento: Option<String>,
    pub fecha_mantenimiento: Option<String>,
    pub kilometraje_mantenimiento: Option<i32>,
    pub descripcion: Option<String>,
    pub estado: Option<String>,
    pub costo_total: Option<f64>,
    pub repuestos_usados: Option<String>,
}

impl Registro for MantenimientoModel {
    const ESTADOS: &'static [&'static str] =
        &["Pendiente", "En Proceso", "Completado", "Cancelado"];
    const TIPOS: &'static [&'static str] = &["Preventivo", "Correctivo", "Revisión general"];

    fn estado(&self) -> &str {
        &self.estado
    }

    fn tipo(&self) -> &str {
        &self.tipo_mantenimiento
    }

    fn vehiculo_id(&self) -> i32 {
        self.vehiculo_id
    }
}

impl Exportable for MantenimientoModel {
    const TITULO_REPORTE: &'static str = "Reporte de Mantenimientos";
    const ETIQUETA_TOTAL: &'static str = "Total mantenimientos";
    const COLUMNAS: &'static [&'static str] =
        &["ID", "Vehículo ID", "Fecha", "Tipo", "Estado", "Costo"];

    fn fila(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.vehiculo_id.to_string(),
            self.fecha_mantenimiento.clone(),
            self.tipo_mantenimiento.clone(),
            self.estado.clone(),
            self.costo_total
                .map_or_else(|| "N/A".to_string(), |costo| format!("Q{costo:.2}")),
        ]
    }
}

// ---------------------------------------------------------------------------
// Inspecciones técnicas
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct InspeccionModel {
    pub id: i32,
    pub vehiculo_id: i32,
    pub fecha_inspeccion: String,
    pub tipo_inspeccion: String,
    pub estado: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspeccionPayload {
    pub vehiculo_id: Option<i32>,
    pub fecha_inspeccion: Option<String>,
    pub tipo_inspeccion: Option<String>,
    pub estado: Option<String>,
}

impl Registro for InspeccionModel {
    const ESTADOS: &'static [&'static str] = &["Pendiente", "Aprobado", "Rechazado", "En Proceso"];
    const TIPOS: &'static [&'static str] =
        &["Periódica", "Inicial", "Extraordinaria", "Preoperacional"];

    fn estado(&self) -> &str {
        &self.estado
    }

    fn tipo(&self) -> &str {
        &self.tipo_inspeccion
    }

    fn vehiculo_id(&self) -> i32 {
        self.vehiculo_id
    }
}

impl Exportable for InspeccionModel {
    const TITULO_REPORTE: &'static str = "Reporte de Inspecciones Técnicas";
    const ETIQUETA_TOTAL: &'static str = "Total inspecciones";
    const COLUMNAS: &'static [&'static str] = &["ID", "Vehículo ID", "Fecha", "Tipo", "Estado"];

    fn fila(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.vehiculo_id.to_string(),
            self.fecha_inspeccion.clone(),
            self.tipo_inspeccion.clone(),
            self.estado.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_de_mantenimiento_llega_en_camel_case() {
        let payload: MantenimientoPayload = serde_json::from_str(
            r#"{
                "vehiculoId": 3,
                "tipoMantenimiento": "Preventivo",
                "fechaMantenimiento": "2023-12-15",
                "kilometrajeMantenimiento": 45000,
                "estado": "Pendiente",
                "costoTotal": 1250.5
            }"#,
        )
        .unwrap();

        assert_eq!(payload.vehiculo_id, Some(3));
        assert_eq!(payload.tipo_mantenimiento.as_deref(), Some("Preventivo"));
        assert_eq!(payload.costo_total, Some(1250.5));
        assert_eq!(payload.descripcion, None);
    }

    #[test]
    fn payload_de_inspeccion_admite_campos_ausentes() {
        let payload: InspeccionPayload = serde_json::from_str(r#"{"vehiculoId": 7}"#).unwrap();
        assert_eq!(payload.vehiculo_id, Some(7));
        assert_eq!(payload.fecha_inspeccion, None);
        assert_eq!(payload.estado, None);
    }

    #[test]
    fn fila_de_mantenimiento_formatea_el_costo() {
        let mantenimiento = MantenimientoModel {
            id: 1,
            vehiculo_id: 3,
            tipo_mantenimiento: "Correctivo".to_string(),
            fecha_mantenimiento: "15-DIC-2023".to_string(),
            kilometraje_mantenimiento: Some(45000),
            descripcion: None,
            estado: "Completado".to_string(),
            costo_total: Some(1250.5),
            repuestos_usados: None,
        };
        assert_eq!(
            mantenimiento.fila(),
            vec!["1", "3", "15-DIC-2023", "Correctivo", "Completado", "Q1250.50"]
        );
    }

    #[test]
    fn fila_sin_costo_reporta_na() {
        let mantenimiento = MantenimientoModel {
            id: 2,
            vehiculo_id: 3,
            tipo_mantenimiento: "Preventivo".to_string(),
            fecha_mantenimiento: "01-ENE-2024".to_string(),
            kilometraje_mantenimiento: None,
            descripcion: None,
            estado: "Pendiente".to_string(),
            costo_total: None,
            repuestos_usados: None,
        };
        assert_eq!(mantenimiento.fila()[5], "N/A");
    }

    #[test]
    fn las_enumeraciones_siguen_el_orden_del_formulario() {
        assert_eq!(
            InspeccionModel::ESTADOS,
            &["Pendiente", "Aprobado", "Rechazado", "En Proceso"][..]
        );
        assert_eq!(
            MantenimientoModel::TIPOS,
            &["Preventivo", "Correctivo", "Revisión general"][..]
        );
    }
}
