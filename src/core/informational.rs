// Fixed reference content. None of these look at the identifier.

use crate::core::dispatch::QueryType;
use crate::core::report::Report;

pub fn leak_reporting() -> Report {
    Report::builder(QueryType::LeakReporting, "¿Cómo Reportar una Fuga?")
        .field("telefono_emergencia", "(05)262-1300 ext.3")
        .field("horario_atencion", "24 horas")
        .field("tiempo_respuesta", "2-4 horas")
        .field("documentos_necesarios", "Ninguno para emergencias")
        .summary("Para reportar una fuga, llame al (05)262-1300 ext.3. Atendemos 24 horas y respondemos en 2-4 horas.")
        .suggestions(&[
            "Cerrar llave de paso",
            "Tomar fotos del problema",
            "Estar disponible para la visita",
        ])
        .build()
}

pub fn meter_change() -> Report {
    Report::builder(QueryType::MeterChange, "¿Cómo Cambiar mi Medidor?")
        .field("proceso", "Solicitud → Inspección → Instalación")
        .field("tiempo_estimado", "7-15 días hábiles")
        .field("costo", "Varía según el tipo de medidor")
        .field("documentos_requeridos", "Cédula, contrato de servicio")
        .summary("El cambio de medidor toma 7-15 días hábiles. Debe presentar cédula y contrato de servicio.")
        .suggestions(&[
            "Agendar inspección",
            "Tipos de medidores disponibles",
            "Costos del servicio",
        ])
        .build()
}

pub fn payment_methods() -> Report {
    Report::builder(QueryType::PaymentMethods, "¿Cómo Puedo Pagar mi Factura?")
        .field("metodos_disponibles", "Efectivo, tarjeta, transferencia, online")
        .field("comision_online", "Sin comisión")
        .field("fecha_limite", "Hasta la fecha de vencimiento")
        .field("recargo_mora", "5% después del vencimiento")
        .summary("Puede pagar en efectivo, con tarjeta, transferencia o en línea sin comisión hasta la fecha de vencimiento.")
        .suggestions(&[
            "Pagar en línea",
            "Ubicaciones de pago",
            "Configurar pago automático",
        ])
        .build()
}

pub fn payment_locations() -> Report {
    Report::builder(QueryType::PaymentLocations, "¿Dónde Puedo Pagar?")
        .field("oficinas_principales", "Centro de Manta Epam")
        .field("bancos_afiliados", "Banco Pacifico, Banco guayaquil")
        .field("supermercados", "Megamaxi, Farmacias cruz azul")
        .field("horarios", "Lunes a viernes 8:00-17:00")
        .summary("Puede pagar en nuestras oficinas, bancos afiliados o supermercados de lunes a viernes de 8:00 a 17:00.")
        .suggestions(&["Oficina más cercana", "Pago en línea 24/7", "App móvil"])
        .build()
}

pub fn online_payment() -> Report {
    Report::builder(QueryType::OnlinePayment, "¿Puedo Pagar en Línea?")
        .field("disponibilidad", "24 horas, 7 días")
        .field("metodos_aceptados", "Tarjetas de crédito/débito")
        .field("comision", "Sin comisión")
        .field("confirmacion", "Inmediata por email y SMS")
        .summary("Sí, puede pagar en línea 24/7 con tarjetas, sin comisión y con confirmación inmediata.")
        .suggestions(&[
            "Acceder al portal de pagos",
            "Descargar app móvil",
            "Registrarse para pago automático",
        ])
        .build()
}

pub fn discounts() -> Report {
    Report::builder(QueryType::Discounts, "¿Hay Descuentos Disponibles?")
        .field("descuento_puntual", "5% por pago antes del vencimiento")
        .field("descuento_tercera_edad", "10% para mayores de 65 años")
        .field("descuento_estudiantes", "10% para estudiantes universitarios")
        .field("programa_lealtad", "Puntos por pagos puntuales")
        .summary("Ofrecemos descuentos del 5% por pago puntual, 10% tercera edad y 10% estudiantes universitarios.")
        .suggestions(&[
            "Aplicar descuento tercera edad",
            "Verificar elegibilidad estudiantes",
            "Programa de lealtad",
        ])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::Handler;

    #[test]
    fn test_static_reports_are_tagged_with_their_own_type() {
        for query_type in QueryType::ALL {
            if let Handler::Static(handler) = query_type.handler() {
                let report = handler();
                assert_eq!(report.query_type, query_type);
                assert!(!report.title.is_empty());
                assert!(!report.summary.is_empty());
                assert!(!report.suggestions.is_empty());
                assert_eq!(report.data.len(), 4);
            }
        }
    }
}
