// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rendering of the `<soc>-pinctrl.h` devicetree binding header.

use crate::config::{Direction, PinDescriptor, PinctrlConfig};
use anyhow::Result;
use std::io::Write;

/// Lines longer than this are split after the macro name.
const MAX_LINE: usize = 100;

fn guard(soc: &str) -> String {
    format!("INC_DT_BINDS_PINCTRL_{}_PINCTRL_HAL_H_", soc.to_uppercase())
}

pub fn file_head(soc: &str, year: i32) -> String {
    let guard = guard(soc);
    format!(
        "/*
 * Copyright (c) {year} Espressif Systems (Shanghai) Co., Ltd.
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * NOTE: Autogenerated file using esp_genpinctrl.py
 */

#ifndef {guard}
#define {guard}

"
    )
}

pub fn file_tail(soc: &str) -> String {
    format!("\n#endif /* {} */\n", guard(soc))
}

/// Formats the `#define` for one GPIO a pin can be routed to. `comment`
/// requests the `/* DEV_PIN */` line that heads each pin's group.
pub fn format_pinmux(
    dev_name: &str,
    pin_name: &str,
    pin: &PinDescriptor,
    io: i64,
    comment: bool,
) -> String {
    let dev = dev_name.to_uppercase();
    let name = pin_name.to_uppercase();
    let define = format!("#define {dev}_{name}_GPIO{io}");
    let value = format!(
        "ESP32_PINMUX({io}, {}, {})",
        pin.signal(Direction::Input),
        pin.signal(Direction::Output),
    );

    let mut out = String::new();
    if comment {
        out.push_str(&format!("/* {dev}_{name} */\n"));
    }
    if define.chars().count() + 1 + value.chars().count() > MAX_LINE {
        out.push_str(&format!("{define} \\\n\t{value}\n\n"));
    } else {
        out.push_str(&format!("{define} {value}\n\n"));
    }
    out
}

/// Writes the whole header to `out`. Fails on the first pin whose `gpio`
/// list can't be resolved, leaving whatever was already written.
pub fn emit(
    out: &mut impl Write,
    soc: &str,
    year: i32,
    config: &PinctrlConfig,
) -> Result<()> {
    out.write_all(file_head(soc, year).as_bytes())?;

    for (dev_name, pins) in config {
        for (pin_name, pin) in pins {
            let ios = pin.gpios()?;
            log::debug!("{dev_name}.{pin_name}: gpios {ios:?}");

            let mut comment = true;
            for io in ios {
                let pinmux =
                    format_pinmux(dev_name, pin_name, pin, io, comment);
                out.write_all(pinmux.as_bytes())?;
                comment = false;
            }
        }
    }

    out.write_all(file_tail(soc).as_bytes())?;
    Ok(())
}

/// Renders the whole header into memory.
pub fn render(soc: &str, year: i32, config: &PinctrlConfig) -> Result<String> {
    let mut out = vec![];
    emit(&mut out, soc, year, config)?;
    Ok(String::from_utf8(out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse, ConfigError};
    use indoc::indoc;

    fn uart_tx() -> PinDescriptor {
        PinDescriptor {
            gpio: None,
            sigi: None,
            sigo: Some("u0txd".to_string()),
        }
    }

    #[test]
    fn short_define_stays_on_one_line() {
        assert_eq!(
            format_pinmux("uart", "tx", &uart_tx(), 5, false),
            "#define UART_TX_GPIO5 ESP32_PINMUX(5, ESP_NOSIG, ESP_U0TXD)\n\n"
        );
    }

    #[test]
    fn long_define_wraps() {
        let pin = PinDescriptor {
            gpio: None,
            sigi: Some("very_long_peripheral_input_signal".to_string()),
            sigo: Some("very_long_peripheral_output_signal".to_string()),
        };
        assert_eq!(
            format_pinmux("lcd_cam", "data_out15", &pin, 21, false),
            "#define LCD_CAM_DATA_OUT15_GPIO21 \\\n\
             \tESP32_PINMUX(21, ESP_VERY_LONG_PERIPHERAL_INPUT_SIGNAL, \
             ESP_VERY_LONG_PERIPHERAL_OUTPUT_SIGNAL)\n\n"
        );
    }

    #[test]
    fn exactly_at_the_limit_is_not_wrapped() {
        // "#define A_B_GPIO1 ESP32_PINMUX(1, ESP_NOSIG, ESP_" is 49 chars,
        // plus the output signal and the closing paren.
        let sigo = |len| PinDescriptor {
            gpio: None,
            sigi: None,
            sigo: Some("x".repeat(len)),
        };
        let fits = format_pinmux("a", "b", &sigo(50), 1, false);
        assert_eq!(fits.lines().count(), 2);
        assert_eq!(fits.lines().next().unwrap().len(), 100);

        let wraps = format_pinmux("a", "b", &sigo(51), 1, false);
        assert!(wraps.starts_with("#define A_B_GPIO1 \\\n\tESP32_PINMUX(1,"));
    }

    #[test]
    fn comment_heads_the_block() {
        assert_eq!(
            format_pinmux("uart", "tx", &uart_tx(), 1, true),
            "/* UART_TX */\n\
             #define UART_TX_GPIO1 ESP32_PINMUX(1, ESP_NOSIG, ESP_U0TXD)\n\n"
        );
    }

    #[test]
    fn render_uart() {
        let cfg = parse(indoc! {"
            uart:
              tx:
                gpio: [1, 2]
                sigo: u0txd
        "})
        .unwrap();
        let expected = indoc! {"
            /*
             * Copyright (c) 2024 Espressif Systems (Shanghai) Co., Ltd.
             *
             * SPDX-License-Identifier: Apache-2.0
             *
             * NOTE: Autogenerated file using esp_genpinctrl.py
             */

            #ifndef INC_DT_BINDS_PINCTRL_ESP32C3_PINCTRL_HAL_H_
            #define INC_DT_BINDS_PINCTRL_ESP32C3_PINCTRL_HAL_H_

            /* UART_TX */
            #define UART_TX_GPIO1 ESP32_PINMUX(1, ESP_NOSIG, ESP_U0TXD)

            #define UART_TX_GPIO2 ESP32_PINMUX(2, ESP_NOSIG, ESP_U0TXD)


            #endif /* INC_DT_BINDS_PINCTRL_ESP32C3_PINCTRL_HAL_H_ */
        "};
        assert_eq!(render("esp32c3", 2024, &cfg).unwrap(), expected);
    }

    #[test]
    fn render_order_ignores_input_order() {
        let a = parse(indoc! {"
            uart:
              tx: {gpio: [[4, 5]], sigo: u0txd}
              rx: {gpio: [3], sigi: u0rxd}
            i2c:
              sda: {gpio: [8]}
        "})
        .unwrap();
        let b = parse(indoc! {"
            i2c:
              sda: {gpio: [8]}
            uart:
              rx: {gpio: [3], sigi: u0rxd}
              tx: {gpio: [[4, 5]], sigo: u0txd}
        "})
        .unwrap();
        let out = render("esp32", 2024, &a).unwrap();
        assert_eq!(out, render("esp32", 2024, &b).unwrap());

        let defines: Vec<_> = out
            .lines()
            .filter_map(|l| l.strip_prefix("#define "))
            .filter_map(|l| l.split(' ').next())
            .collect();
        assert_eq!(
            defines,
            [
                "INC_DT_BINDS_PINCTRL_ESP32_PINCTRL_HAL_H_",
                "I2C_SDA_GPIO8",
                "UART_RX_GPIO3",
                "UART_TX_GPIO4",
                "UART_TX_GPIO5",
            ]
        );
        let comments: Vec<_> =
            out.lines().filter(|l| l.starts_with("/* ")).collect();
        assert_eq!(
            comments,
            ["/* I2C_SDA */", "/* UART_RX */", "/* UART_TX */"]
        );
    }

    #[test]
    fn empty_expansion_emits_nothing() {
        let cfg = parse("uart:\n  tx: {gpio: [[5, 3]]}\n").unwrap();
        let out = render("esp32", 2024, &cfg).unwrap();
        assert!(!out.contains("UART_TX"));
    }

    #[test]
    fn render_missing_gpio() {
        let cfg = parse("uart:\n  tx: {sigo: u0txd}\n").unwrap();
        let err = render("esp32", 2024, &cfg).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::new("gpio", "missing property"))
        );
    }
}
