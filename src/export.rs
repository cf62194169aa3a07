//! Renderizado de la lista filtrada y su resumen como artefactos
//! descargables: un reporte tabular paginado y un libro CSV de dos hojas.
//!
//! Los dos adaptadores son de solo lectura sobre la lista y el resumen.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::model::Exportable;
use crate::stats::ResumenEstadistico;

pub struct ReporteConfig {
    /// Consulta aplicada a la lista, impresa bajo el título cuando existe.
    pub filtro: Option<String>,
    /// Ruta del logotipo a incrustar en el encabezado, si se configuró.
    pub logo: Option<PathBuf>,
    pub filas_por_pagina: usize,
}

impl Default for ReporteConfig {
    fn default() -> Self {
        Self {
            filtro: None,
            logo: None,
            filas_por_pagina: 25,
        }
    }
}

/// Artefacto del reporte. `advertencias` acumula las condiciones no
/// abortivas (el logotipo ilegible): el contenido se produce igual y el
/// llamador decide cómo notificarlas.
pub struct Reporte {
    pub contenido: String,
    pub advertencias: Vec<String>,
}

/// Genera el reporte tabular: encabezado con título y resumen estadístico,
/// tabla de columnas fijas y, en cada página, un pie de dos líneas con el
/// número de página y la marca de tiempo de generación.
pub fn generar_reporte<R: Exportable>(
    registros: &[&R],
    resumen: &ResumenEstadistico,
    config: &ReporteConfig,
) -> Reporte {
    let mut advertencias = Vec::new();
    let mut contenido = String::new();

    if let Some(ruta) = &config.logo {
        match fs::read(ruta) {
            Ok(bytes) => {
                let nombre = ruta
                    .file_name()
                    .map_or_else(|| ruta.display().to_string(), |n| n.to_string_lossy().into_owned());
                let _ = writeln!(contenido, "[Logotipo: {nombre} ({} bytes)]", bytes.len());
            }
            Err(motivo) => {
                log::warn!("No se pudo cargar el logo para el reporte: {motivo}");
                advertencias.push("No se pudo cargar el logo para el reporte".to_string());
            }
        }
    }

    let _ = writeln!(contenido, "{}", R::TITULO_REPORTE);
    if let Some(filtro) = config.filtro.as_deref().filter(|filtro| !filtro.is_empty()) {
        let _ = writeln!(contenido, "Filtro aplicado: \"{filtro}\"");
    }
    contenido.push('\n');

    contenido.push_str("Resumen Estadístico:\n");
    let _ = writeln!(contenido, "- {}: {}", R::ETIQUETA_TOTAL, resumen.total);
    for conteo in &resumen.por_estado {
        let _ = writeln!(
            contenido,
            "- {}: {} ({:.1}%)",
            conteo.valor, conteo.cantidad, conteo.porcentaje
        );
    }
    contenido.push_str("Por tipo:\n");
    for conteo in &resumen.por_tipo {
        let _ = writeln!(
            contenido,
            "- {}: {} ({:.1}%)",
            conteo.valor, conteo.cantidad, conteo.porcentaje
        );
    }
    contenido.push('\n');

    let filas: Vec<Vec<String>> = registros.iter().map(|registro| registro.fila()).collect();
    let anchos = anchos_de_columna::<R>(&filas);
    let encabezado = formatear_fila(R::COLUMNAS.iter().map(|c| (*c).to_string()), &anchos);
    let separador: String = anchos
        .iter()
        .map(|ancho| "-".repeat(*ancho))
        .collect::<Vec<_>>()
        .join("  ");
    let generado = Local::now().format("%d/%m/%Y %H:%M:%S").to_string();

    let filas_por_pagina = config.filas_por_pagina.max(1);
    let mut paginas: Vec<&[Vec<String>]> = filas.chunks(filas_por_pagina).collect();
    if paginas.is_empty() {
        // Sin registros igual sale una página con encabezado y pie.
        paginas.push(&[]);
    }

    for (indice, pagina) in paginas.iter().enumerate() {
        if indice > 0 {
            contenido.push('\n');
        }
        contenido.push_str(&encabezado);
        contenido.push('\n');
        contenido.push_str(&separador);
        contenido.push('\n');
        for fila in pagina.iter() {
            contenido.push_str(&formatear_fila(fila.iter().cloned(), &anchos));
            contenido.push('\n');
        }
        let _ = writeln!(contenido, "\nPágina {}", indice + 1);
        let _ = writeln!(contenido, "Generado el {generado}");
    }

    Reporte {
        contenido,
        advertencias,
    }
}

fn anchos_de_columna<R: Exportable>(filas: &[Vec<String>]) -> Vec<usize> {
    let mut anchos: Vec<usize> = R::COLUMNAS
        .iter()
        .map(|columna| columna.chars().count())
        .collect();
    for fila in filas {
        for (indice, celda) in fila.iter().enumerate() {
            if indice < anchos.len() {
                anchos[indice] = anchos[indice].max(celda.chars().count());
            }
        }
    }
    anchos
}

fn formatear_fila(celdas: impl Iterator<Item = String>, anchos: &[usize]) -> String {
    let alineadas: Vec<String> = celdas
        .zip(anchos.iter())
        .map(|(celda, ancho)| {
            let relleno = ancho.saturating_sub(celda.chars().count());
            format!("{celda}{}", " ".repeat(relleno))
        })
        .collect();
    alineadas.join("  ").trim_end().to_string()
}

/// Exporta la lista filtrada como libro CSV: una hoja con los registros y una
/// segunda hoja "Estadísticas" con el resumen. Nunca depende de recursos
/// externos, así que no tiene modo degradado.
pub fn exportar_csv<R: Exportable>(
    registros: &[&R],
    resumen: &ResumenEstadistico,
) -> Result<String, csv::Error> {
    let mut escritor = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    escritor.write_record(R::COLUMNAS)?;
    for registro in registros {
        escritor.write_record(registro.fila())?;
    }

    escritor.write_record([""])?;
    escritor.write_record(["Estadísticas"])?;
    escritor.write_record(["Métrica", "Valor", "Porcentaje"])?;
    let total = resumen.total.to_string();
    escritor.write_record([R::ETIQUETA_TOTAL, total.as_str(), ""])?;
    for conteo in resumen.por_estado.iter().chain(resumen.por_tipo.iter()) {
        let cantidad = conteo.cantidad.to_string();
        let porcentaje = format!("{:.1}%", conteo.porcentaje);
        escritor.write_record([conteo.valor.as_str(), cantidad.as_str(), porcentaje.as_str()])?;
    }

    let bytes = escritor
        .into_inner()
        .map_err(|error| error.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
